//! Jet renderings of portable SQL functions.

use crate::error::{Result, RewriteError};

/// How a portable function is spelled in Jet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionTemplate {
    /// A renamed function taking its arguments unchanged.
    Rename(&'static str),
    /// A fixed expansion where `?1`, `?2`, .. stand for the arguments.
    Template(&'static str),
    /// A function without parentheses, like `Now`.
    Bare(&'static str),
    /// Arguments joined with `+` in parentheses.
    Concat,
    /// `IIf(IsNull(a), IIf(IsNull(b), .., b), a)`.
    Coalesce,
}

/// Functions every Jet dialect knows.
pub(super) fn base(name: &str) -> Option<FunctionTemplate> {
    let template = match name {
        "upper" => FunctionTemplate::Rename("ucase"),
        "lower" => FunctionTemplate::Rename("lcase"),
        "current_timestamp" => FunctionTemplate::Bare("Now"),
        "mod" => FunctionTemplate::Template("(?1 Mod ?2)"),
        _ => return None,
    };
    Some(template)
}

/// Functions of the extended dialect.
pub(super) fn extended(name: &str) -> Option<FunctionTemplate> {
    let template = match name {
        "concat" => FunctionTemplate::Concat,
        "length" => FunctionTemplate::Rename("len"),
        "substring" => FunctionTemplate::Template("mid(?1, ?2+1, ?3)"),
        "date" => FunctionTemplate::Template("dateadd('d', 0, datediff('d', 0, ?1))"),
        "sqrt" => FunctionTemplate::Template("Sqr(?1)"),
        "coalesce" => FunctionTemplate::Coalesce,
        "nullif" => FunctionTemplate::Template("IIf(?1 = ?2, Null, ?1)"),
        _ => return None,
    };
    Some(template)
}

/// Trim functions, emulated with Jet's own.
pub(super) fn trim(name: &str) -> Option<FunctionTemplate> {
    let template = match name {
        "trim" => FunctionTemplate::Rename("Trim"),
        "ltrim" => FunctionTemplate::Rename("LTrim"),
        "rtrim" => FunctionTemplate::Rename("RTrim"),
        _ => return None,
    };
    Some(template)
}

impl FunctionTemplate {
    /// Renders a call with the given argument texts.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::UnsupportedConstruct`] if the template refers
    /// to an argument that was not supplied.
    pub fn render(self, name: &str, args: &[&str]) -> Result<String> {
        match self {
            Self::Rename(jet) => Ok(format!("{jet}({})", args.join(", "))),
            Self::Bare(jet) => Ok(String::from(jet)),
            Self::Concat => {
                if args.is_empty() {
                    return Err(missing_argument(name, 1));
                }
                Ok(format!("({})", args.join(" + ")))
            }
            Self::Coalesce => {
                let (last, rest) = args.split_last().ok_or_else(|| missing_argument(name, 1))?;
                Ok(rest
                    .iter()
                    .rev()
                    .fold(String::from(*last), |inner, arg| {
                        format!("IIf(IsNull({arg}), {inner}, {arg})")
                    }))
            }
            Self::Template(template) => expand(name, template, args),
        }
    }
}

fn missing_argument(name: &str, n: usize) -> RewriteError {
    RewriteError::unsupported("function", format!("{name} is missing argument {n}"))
}

/// Substitutes `?N` with the N-th argument.
fn expand(name: &str, template: &str, args: &[&str]) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(at) = rest.find('?') {
        out.push_str(&rest[..at]);
        let digits: String = rest[at + 1..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        let n: usize = digits.parse().map_err(|_| missing_argument(name, 0))?;
        let arg = n
            .checked_sub(1)
            .and_then(|i| args.get(i))
            .ok_or_else(|| missing_argument(name, n))?;
        out.push_str(arg);
        rest = &rest[at + 1 + digits.len()..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_expansion() {
        let substring = extended("substring").unwrap();
        assert_eq!(
            substring.render("substring", &["name", "@p0", "3"]).unwrap(),
            "mid(name, @p0+1, 3)"
        );
        assert!(substring.render("substring", &["name"]).is_err());
    }

    #[test]
    fn test_concat_and_coalesce() {
        assert_eq!(
            FunctionTemplate::Concat.render("concat", &["a", "' '", "b"]).unwrap(),
            "(a + ' ' + b)"
        );
        assert_eq!(
            FunctionTemplate::Coalesce.render("coalesce", &["a", "b", "0"]).unwrap(),
            "IIf(IsNull(a), IIf(IsNull(b), 0, b), a)"
        );
        assert_eq!(FunctionTemplate::Coalesce.render("coalesce", &["a"]).unwrap(), "a");
    }

    #[test]
    fn test_bare_and_rename() {
        assert_eq!(base("current_timestamp").unwrap().render("current_timestamp", &[]).unwrap(), "Now");
        assert_eq!(extended("length").unwrap().render("length", &["s"]).unwrap(), "len(s)");
        assert_eq!(trim("ltrim").unwrap().render("ltrim", &["s"]).unwrap(), "LTrim(s)");
        assert!(base("concat").is_none());
    }
}
