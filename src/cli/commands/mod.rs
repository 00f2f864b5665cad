mod check;
mod group;
mod history;
mod identity;
mod passwd;
mod profile;
mod provision;
mod register;

pub use check::{cmd_check, cmd_login};
pub use group::{cmd_group_add, cmd_group_grant, cmd_group_list, cmd_group_revoke};
pub use history::cmd_history;
pub use identity::{cmd_identity_show, cmd_identity_state};
pub use passwd::cmd_passwd;
pub use profile::cmd_profile;
pub use provision::cmd_provision;
pub use register::{RegisterArgs, cmd_link, cmd_register};

/// Reads one line from stdin after printing `prompt`, without the line ending.
fn read_secret(prompt: &str) -> anyhow::Result<String> {
    use std::io::Write;

    print!("{prompt}");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}
