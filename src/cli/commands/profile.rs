use crate::domain::IdentityId;
use crate::state::AppState;

pub async fn cmd_profile(state: &AppState, identity: i32) -> anyhow::Result<()> {
    let Some(profile) = state
        .auth
        .get_profile(&state.context(), IdentityId::new(identity))
        .await?
    else {
        println!("No profile kind configured.");
        println!("Set auth.auth_profile in gatekeep.toml, e.g. \"user_profile\".");
        return Ok(());
    };

    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}
