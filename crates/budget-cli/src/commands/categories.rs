use budget_core::storage::Category;

use crate::app::AppContext;
use crate::cli::{CategoryAddArgs, CategoryCommands};
use crate::helpers::parse_color;
use crate::output::{json, print_json, text};

use super::settle_mirror;

pub async fn handle_category(
    ctx: &AppContext<'_>,
    command: &CategoryCommands,
) -> anyhow::Result<()> {
    match command {
        CategoryCommands::List(args) => {
            let repo = ctx.repo()?;
            let categories = repo.categories(&ctx.category_owner()?).current()?;
            if args.json {
                return print_json(&json::categories_json(&categories));
            }
            text::print_categories(&categories);
            Ok(())
        }
        CategoryCommands::Add(args) => handle_add(ctx, args).await,
    }
}

async fn handle_add(ctx: &AppContext<'_>, args: &CategoryAddArgs) -> anyhow::Result<()> {
    let repo = ctx.repo()?;
    let owner = ctx.owner()?;

    let name = args.name.trim();
    if name.is_empty() {
        return Err(anyhow::anyhow!("Category name must not be blank"));
    }
    let existing = repo.categories(&ctx.category_owner()?).current()?;
    if existing.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
        return Err(anyhow::anyhow!("Category \"{}\" already exists", name));
    }

    let mut category = Category::new(name, parse_color(&args.color)?);
    if let Some(ref icon) = args.icon {
        category = category.with_icon(icon.clone());
    }
    if !owner.is_empty() {
        category = category.with_owner(owner.as_str());
    }

    let saved = repo.insert(&owner, category)?;
    let id = saved.record.id;
    settle_mirror(ctx, saved.mirror).await;

    if !ctx.quiet() {
        println!("Added category {} ({})", name, id);
    }
    Ok(())
}
