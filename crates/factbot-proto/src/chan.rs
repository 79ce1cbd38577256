//! Telling channels apart from nicks.

/// Characters that open a channel name.
pub const CHANNEL_SIGILS: [char; 4] = ['#', '&', '+', '!'];

/// Longest channel name servers are required to accept.
pub const MAX_CHANNEL_LEN: usize = 50;

/// Channel-name test for anything string-like.
pub trait ChannelExt {
    /// A sigil, then up to [`MAX_CHANNEL_LEN`] characters in total with no
    /// space, comma or control character.
    fn is_channel_name(&self) -> bool;
}

impl<T: AsRef<str> + ?Sized> ChannelExt for T {
    fn is_channel_name(&self) -> bool {
        let name = self.as_ref();
        name.starts_with(CHANNEL_SIGILS)
            && name.chars().count() <= MAX_CHANNEL_LEN
            && !name.contains(|c: char| c == ' ' || c == ',' || c.is_control())
    }
}
