use budget_core::storage::UserProfile;

use crate::app::AppContext;
use crate::cli::{ProfileCommands, ProfileSetArgs};
use crate::output::{json, print_json};

pub async fn handle_profile(ctx: &AppContext<'_>, command: &ProfileCommands) -> anyhow::Result<()> {
    match command {
        ProfileCommands::Show(args) => {
            let profile = fetch(ctx).await?;
            if args.json {
                return print_json(&json::profile_json(&profile));
            }
            print_profile(&profile);
            Ok(())
        }
        ProfileCommands::Set(args) => handle_set(ctx, args).await,
    }
}

async fn fetch(ctx: &AppContext<'_>) -> anyhow::Result<UserProfile> {
    let repo = ctx.repo()?;
    let owner = ctx.owner()?;
    let profile = repo.fetch_profile(&owner).await?.unwrap_or_else(|| UserProfile {
        id: owner,
        ..UserProfile::default()
    });
    Ok(profile)
}

async fn handle_set(ctx: &AppContext<'_>, args: &ProfileSetArgs) -> anyhow::Result<()> {
    let mut profile = fetch(ctx).await?;

    let updates = [
        (&mut profile.name, &args.name),
        (&mut profile.email, &args.email),
        (&mut profile.phone, &args.phone),
        (&mut profile.avatar_url, &args.avatar_url),
        (&mut profile.birthday, &args.birthday),
    ];
    let mut changed = false;
    for (field, value) in updates {
        if let Some(value) = value {
            *field = value.clone();
            changed = true;
        }
    }
    if !changed {
        return Err(anyhow::anyhow!(
            "Nothing to update.\nHint: Pass at least one of --name, --email, --phone, --avatar-url, --birthday."
        ));
    }

    ctx.repo()?.save_profile(&profile).await?;
    if !ctx.quiet() {
        println!("Updated profile for {}", profile.id);
    }
    Ok(())
}

fn print_profile(profile: &UserProfile) {
    let rows = [
        ("Owner", &profile.id),
        ("Name", &profile.name),
        ("Email", &profile.email),
        ("Phone", &profile.phone),
        ("Avatar", &profile.avatar_url),
        ("Birthday", &profile.birthday),
    ];
    for (label, value) in rows {
        if !value.is_empty() {
            println!("{:<10}{}", format!("{}:", label), value);
        }
    }
}
