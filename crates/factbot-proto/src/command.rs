//! IRC commands understood by factbot.
//!
//! Only the commands a client bot sends or reacts to get dedicated
//! variants; everything else round-trips through [`Command::Raw`].

use std::fmt;

use crate::error::MessageParseError;

/// An IRC command with its parameters.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `PASS password`
    PASS(String),
    /// `NICK nickname`
    NICK(String),
    /// `USER user mode * :realname`
    USER(String, String, String),
    /// `PING server [server2]`
    PING(String, Option<String>),
    /// `PONG server [server2]`
    PONG(String, Option<String>),
    /// `JOIN channel [key]`
    JOIN(String, Option<String>),
    /// `PART channel [:reason]`
    PART(String, Option<String>),
    /// `PRIVMSG target :text`
    PRIVMSG(String, String),
    /// `NOTICE target :text`
    NOTICE(String, String),
    /// `QUIT [:reason]`
    QUIT(Option<String>),
    /// `ERROR :reason`
    ERROR(String),
    /// Three-digit numeric reply.
    Response(u16, Vec<String>),
    /// Any other command, kept verbatim.
    Raw(String, Vec<String>),
}

/// Parameter `idx` of `verb`, which takes at least `needed` of them.
fn arg(verb: &'static str, args: &[&str], idx: usize, needed: usize) -> Result<String, MessageParseError> {
    args.get(idx)
        .map(|s| (*s).to_owned())
        .ok_or(MessageParseError::MissingParams {
            verb,
            needed,
            got: args.len(),
        })
}

fn opt_arg(args: &[&str], idx: usize) -> Option<String> {
    args.get(idx).map(|s| (*s).to_owned())
}

impl Command {
    /// Build a command from its name and raw parameters.
    pub fn new(cmd: &str, args: Vec<&str>) -> Result<Command, MessageParseError> {
        if cmd.is_empty() {
            return Err(MessageParseError::BadCommand);
        }

        if cmd.len() == 3 && cmd.bytes().all(|b| b.is_ascii_digit()) {
            let code = cmd
                .parse::<u16>()
                .map_err(|_| MessageParseError::BadCommand)?;
            return Ok(Command::Response(
                code,
                args.into_iter().map(str::to_owned).collect(),
            ));
        }

        let upper = cmd.to_ascii_uppercase();
        let command = match upper.as_str() {
            "PASS" => Command::PASS(arg("PASS", &args, 0, 1)?),
            "NICK" => Command::NICK(arg("NICK", &args, 0, 1)?),
            "USER" => {
                let param = |idx| arg("USER", &args, idx, 4);
                Command::USER(param(0)?, param(1)?, param(3)?)
            }
            "PING" => Command::PING(arg("PING", &args, 0, 1)?, opt_arg(&args, 1)),
            "PONG" => Command::PONG(arg("PONG", &args, 0, 1)?, opt_arg(&args, 1)),
            "JOIN" => Command::JOIN(arg("JOIN", &args, 0, 1)?, opt_arg(&args, 1)),
            "PART" => Command::PART(arg("PART", &args, 0, 1)?, opt_arg(&args, 1)),
            "PRIVMSG" => {
                let param = |idx| arg("PRIVMSG", &args, idx, 2);
                Command::PRIVMSG(param(0)?, param(1)?)
            }
            "NOTICE" => {
                let param = |idx| arg("NOTICE", &args, idx, 2);
                Command::NOTICE(param(0)?, param(1)?)
            }
            "QUIT" => Command::QUIT(opt_arg(&args, 0)),
            "ERROR" => Command::ERROR(arg("ERROR", &args, 0, 1)?),
            _ => Command::Raw(upper, args.into_iter().map(str::to_owned).collect()),
        };
        Ok(command)
    }

    /// The command name as it appears on the wire.
    pub fn name(&self) -> String {
        match self {
            Command::PASS(_) => "PASS".into(),
            Command::NICK(_) => "NICK".into(),
            Command::USER(..) => "USER".into(),
            Command::PING(..) => "PING".into(),
            Command::PONG(..) => "PONG".into(),
            Command::JOIN(..) => "JOIN".into(),
            Command::PART(..) => "PART".into(),
            Command::PRIVMSG(..) => "PRIVMSG".into(),
            Command::NOTICE(..) => "NOTICE".into(),
            Command::QUIT(_) => "QUIT".into(),
            Command::ERROR(_) => "ERROR".into(),
            Command::Response(code, _) => format!("{:03}", code),
            Command::Raw(name, _) => name.clone(),
        }
    }
}

/// Whether a parameter has to be sent as the trailing (`:`) parameter.
fn needs_trailing(param: &str) -> bool {
    param.is_empty() || param.contains(' ') || param.starts_with(':')
}

fn write_params(f: &mut fmt::Formatter<'_>, middle: &[&str], trailing: Option<&str>) -> fmt::Result {
    for param in middle {
        write!(f, " {}", param)?;
    }
    if let Some(trailing) = trailing {
        write!(f, " :{}", trailing)?;
    }
    Ok(())
}

fn write_list(f: &mut fmt::Formatter<'_>, params: &[String]) -> fmt::Result {
    let Some((last, middle)) = params.split_last() else {
        return Ok(());
    };
    for param in middle {
        write!(f, " {}", param)?;
    }
    if needs_trailing(last) {
        write!(f, " :{}", last)
    } else {
        write!(f, " {}", last)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())?;
        match self {
            Command::PASS(p) | Command::NICK(p) => write_params(f, &[p.as_str()], None),
            Command::USER(user, mode, realname) => {
                write_params(f, &[user.as_str(), mode.as_str(), "*"], Some(realname.as_str()))
            }
            Command::PING(a, b) | Command::PONG(a, b) => match b {
                Some(b) => write_params(f, &[a.as_str()], Some(b.as_str())),
                None => write_params(f, &[], Some(a.as_str())),
            },
            Command::JOIN(chan, key) => match key {
                Some(key) => write_params(f, &[chan.as_str(), key.as_str()], None),
                None => write_params(f, &[chan.as_str()], None),
            },
            Command::PART(chan, reason) => write_params(f, &[chan.as_str()], reason.as_deref()),
            Command::PRIVMSG(target, text) | Command::NOTICE(target, text) => {
                write_params(f, &[target.as_str()], Some(text.as_str()))
            }
            Command::QUIT(reason) => write_params(f, &[], reason.as_deref()),
            Command::ERROR(reason) => write_params(f, &[], Some(reason.as_str())),
            Command::Response(_, params) | Command::Raw(_, params) => write_list(f, params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_becomes_response() {
        let cmd = Command::new("001", vec!["bot", "Welcome"]).unwrap();
        assert_eq!(
            cmd,
            Command::Response(1, vec!["bot".into(), "Welcome".into()])
        );
        assert_eq!(cmd.name(), "001");
    }

    #[test]
    fn privmsg_requires_text() {
        let err = Command::new("PRIVMSG", vec!["#chan"]).unwrap_err();
        assert!(matches!(
            err,
            MessageParseError::MissingParams {
                verb: "PRIVMSG",
                needed: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn unknown_commands_are_raw() {
        let cmd = Command::new("mode", vec!["#chan", "+o", "bob"]).unwrap();
        assert_eq!(cmd.to_string(), "MODE #chan +o bob");
    }

    #[test]
    fn serializes_client_commands() {
        assert_eq!(
            Command::USER("bot".into(), "0".into(), "Fact Bot".into()).to_string(),
            "USER bot 0 * :Fact Bot"
        );
        assert_eq!(
            Command::PONG("irc.example.net".into(), None).to_string(),
            "PONG :irc.example.net"
        );
        assert_eq!(Command::QUIT(None).to_string(), "QUIT");
        assert_eq!(
            Command::JOIN("#rust".into(), None).to_string(),
            "JOIN #rust"
        );
    }

    #[test]
    fn raw_trailing_param_gets_colon() {
        let cmd = Command::Raw("TOPIC".into(), vec!["#chan".into(), "new topic".into()]);
        assert_eq!(cmd.to_string(), "TOPIC #chan :new topic");
    }
}
