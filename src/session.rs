use serde::Serialize;

/// Process-wide flags shared by the minigame, decoder and background scheduler.
///
/// Lives for one boot; a hard reset replaces it with the default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Set the first time a minigame round is won.
    pub has_been_hacked: bool,
    /// True exactly while a round is between trigger and win/fail.
    pub minigame_active: bool,
    /// Set once the decoded code is accepted by the verify app.
    pub verify_won: bool,
}
