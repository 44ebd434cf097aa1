use std::fmt::{self, Display};

const TRUNCATE_AT: usize = 497;

pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Displays at most the first few hundred bytes of a string, used to keep long queries out of logs.
pub struct Truncated<'a>(pub &'a str);

impl Display for Truncated<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0;
        if value.len() <= TRUNCATE_AT {
            return f.write_str(value.trim_end());
        }
        let mut end = TRUNCATE_AT;
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        write!(f, "{}...", value[..end].trim_end())
    }
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        $crate::Truncated(::std::convert::AsRef::<str>::as_ref(&$query))
    };
}
