use crate::client::FetchError;
use crate::models::ProfileRecord;

/// Formats a profile into the text shown in the output panel.
pub fn render_profile(user: &ProfileRecord) -> String {
    format!(
        "\nGithub User Information:\n\nLogin: {}\nName: {}\nBio: {}\nLocation: {}\nFollowers: {}\nFollowing: {}\n",
        user.login, user.name, user.bio, user.location, user.followers, user.following
    )
}

pub fn render_error(err: &FetchError) -> String {
    format!("Error: {err}")
}
