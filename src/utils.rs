pub(crate) fn is_cased(c: char) -> bool {
    c.is_lowercase() || c.is_uppercase()
}

/// Uppercase the first cased character, leaving everything before and after it as is.
pub(crate) fn uppercase_first_cased(s: &str) -> String {
    match s.char_indices().find(|&(_, c)| is_cased(c)) {
        None => s.to_owned(),
        Some((index, first)) => {
            let rest = &s[index + first.len_utf8()..];
            let mut string = String::with_capacity(s.len() + 2);
            string.push_str(&s[..index]);
            string.extend(first.to_uppercase());
            string.push_str(rest);
            string
        }
    }
}

pub(crate) fn join_with_spaces<I>(mut iter: I) -> String
where
    I: Iterator + Clone,
    I::Item: AsRef<str>,
{
    let length: usize = iter
        .clone()
        .map(|item| item.as_ref().len() + 1)
        .sum::<usize>()
        .saturating_sub(1);
    let mut string = String::with_capacity(length);

    match iter.next() {
        Some(item) => string.push_str(item.as_ref()),
        None => return string,
    };

    for item in iter {
        string.push(' ');
        string.push_str(item.as_ref());
    }
    string
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercase_first_cased() {
        assert_eq!("Hello", uppercase_first_cased("hello"));
        assert_eq!("'Tis", uppercase_first_cased("'tis"));
        assert_eq!("2Nd", uppercase_first_cased("2nd"));
        assert_eq!("Émile", uppercase_first_cased("émile"));
        assert_eq!("...", uppercase_first_cased("..."));
        assert_eq!("", uppercase_first_cased(""));
    }

    #[test]
    fn test_join_with_spaces() {
        assert_eq!("a bb ccc", join_with_spaces(["a", "bb", "ccc"].iter()));
        assert_eq!("", join_with_spaces(Vec::<String>::new().iter()));
    }
}
