//! The IRC line grammar as nom combinators.
//!
//! ```text
//! line     = [ "@" tags SP ] [ ":" source SP ] verb params *SP [ CR / LF ]
//! verb     = 1*letter / 3digit
//! params   = *14( SP middle ) [ SP ":" trailing ]
//! ```
//!
//! Every piece of a [`Line`] borrows from the input; `FromStr for Message`
//! builds the owned form.

use nom::bytes::complete::{take_till, take_till1, take_while, take_while1};
use nom::character::complete::char;
use nom::combinator::{eof, opt, verify};
use nom::error::ErrorKind;
use nom::sequence::{preceded, terminated};
use nom::IResult;
use smallvec::SmallVec;

/// At most 15 parameters; anything past that is dropped.
const MAX_PARAMS: usize = 15;

pub(crate) type Params<'a> = SmallVec<[&'a str; MAX_PARAMS]>;

/// One IRC line split into its parts.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Line<'a> {
    /// Tag section without the `@`.
    pub tags: Option<&'a str>,
    /// Source without the `:`.
    pub source: Option<&'a str>,
    pub verb: &'a str,
    /// Middle parameters followed by the trailing one, if any.
    pub params: Params<'a>,
}

/// Where and why a line was rejected.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ParseFailure {
    pub position: usize,
    pub kind: ErrorKind,
}

impl<'a> Line<'a> {
    pub fn parse(input: &'a str) -> Result<Self, ParseFailure> {
        line(input).map(|(_, line)| line).map_err(|e| match e {
            nom::Err::Error(e) | nom::Err::Failure(e) => ParseFailure {
                position: input.len() - e.input.len(),
                kind: e.code,
            },
            nom::Err::Incomplete(_) => ParseFailure {
                position: input.len(),
                kind: ErrorKind::Eof,
            },
        })
    }
}

fn is_space(c: char) -> bool {
    c == ' '
}

fn is_line_end(c: char) -> bool {
    c == '\r' || c == '\n'
}

fn gap(input: &str) -> IResult<&str, &str> {
    take_while1(is_space)(input)
}

fn word(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| is_space(c) || is_line_end(c))(input)
}

fn tags(input: &str) -> IResult<&str, &str> {
    terminated(preceded(char('@'), word), gap)(input)
}

fn source(input: &str) -> IResult<&str, &str> {
    terminated(preceded(char(':'), word), gap)(input)
}

fn verb(input: &str) -> IResult<&str, &str> {
    verify(take_while1(|c: char| c.is_ascii_alphanumeric()), |v: &str| {
        v.bytes().all(|b| b.is_ascii_alphabetic())
            || (v.len() == 3 && v.bytes().all(|b| b.is_ascii_digit()))
    })(input)
}

fn middle(input: &str) -> IResult<&str, &str> {
    preceded(gap, verify(word, |p: &str| !p.starts_with(':')))(input)
}

fn trailing(input: &str) -> IResult<&str, &str> {
    preceded(gap, preceded(char(':'), take_till(is_line_end)))(input)
}

fn params(mut input: &str) -> IResult<&str, Params<'_>> {
    let mut params = Params::new();
    while params.len() < MAX_PARAMS {
        if let Ok((rest, text)) = trailing(input) {
            params.push(text);
            return Ok((rest, params));
        }
        match middle(input) {
            Ok((rest, param)) => {
                params.push(param);
                input = rest;
            }
            Err(nom::Err::Error(_)) => return Ok((input, params)),
            Err(e) => return Err(e),
        }
    }
    let (input, _overflow) = take_till(is_line_end)(input)?;
    Ok((input, params))
}

fn line(input: &str) -> IResult<&str, Line<'_>> {
    let (input, tags) = opt(tags)(input)?;
    let (input, source) = opt(source)(input)?;
    let (input, verb) = verb(input)?;
    let (input, params) = params(input)?;
    let (input, _) = take_while(is_space)(input)?;
    let (input, _) = take_while(is_line_end)(input)?;
    let (input, _) = eof(input)?;
    Ok((
        input,
        Line {
            tags,
            source,
            verb,
            params,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_verb() {
        let line = Line::parse("PING").unwrap();
        assert_eq!(line.verb, "PING");
        assert_eq!((line.tags, line.source), (None, None));
        assert!(line.params.is_empty());
    }

    #[test]
    fn source_middle_and_trailing() {
        let line = Line::parse(":alice!a@host PRIVMSG #rust :is it fast?").unwrap();
        assert_eq!(line.source, Some("alice!a@host"));
        assert_eq!(line.verb, "PRIVMSG");
        assert_eq!(line.params.as_slice(), &["#rust", "is it fast?"]);
    }

    #[test]
    fn tag_section_is_kept_raw() {
        let line = Line::parse("@account=alice;msgid=7 :alice PRIVMSG #rust :hi\r\n").unwrap();
        assert_eq!(line.tags, Some("account=alice;msgid=7"));
        assert_eq!(line.params.as_slice(), &["#rust", "hi"]);
    }

    #[test]
    fn trailing_may_be_empty_or_hold_colons() {
        assert_eq!(Line::parse("PRIVMSG #rust :").unwrap().params.as_slice(), &["#rust", ""]);
        assert_eq!(
            Line::parse("PRIVMSG #rust ::) ok").unwrap().params.as_slice(),
            &["#rust", ":) ok"]
        );
    }

    #[test]
    fn extra_spaces_are_separators() {
        let line = Line::parse("JOIN   #a    key  \r\n").unwrap();
        assert_eq!(line.params.as_slice(), &["#a", "key"]);
    }

    #[test]
    fn verb_must_be_letters_or_three_digits() {
        assert_eq!(Line::parse(":irc.test 001 factbot :Welcome").unwrap().verb, "001");
        assert!(Line::parse("PING123").is_err());
        assert!(Line::parse("12").is_err());
        assert!(Line::parse(":only.a.source").is_err());
        assert!(Line::parse("").is_err());
    }

    #[test]
    fn failure_reports_position() {
        let failure = Line::parse(":alice PR1VMSG #rust :x").unwrap_err();
        assert_eq!(failure.position, ":alice ".len());
    }

    #[test]
    fn params_past_fifteen_are_dropped() {
        let raw = "005 factbot a b c d e f g h i j k l m n o p :are supported";
        let line = Line::parse(raw).unwrap();
        assert_eq!(line.params.len(), 15);
        assert_eq!(line.params[14], "n");
    }
}
