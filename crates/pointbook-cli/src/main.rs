use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use pointbook_core::config::Config;
use pointbook_core::{
    CategoryStore, EventBook, EventUpdate, HierarchyResult, JsonFileStore, Member, MemberId,
    MemberRegistry, PermissionPolicy, PointbookError, PointsEngine, RecordBook, RecordFilter,
    Result,
};

mod args;
use args::{
    CategoryAction, Cli, Commands, ConfigAction, EventAction, ExceptionAction, MemberAction,
    RecordAction, Shell,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let base_dir = resolve_base_dir(cli.base_dir);
    init_tracing(&base_dir, cli.verbose, cli.quiet);

    let result = match cli.command {
        Some(Commands::Points {
            member,
            caller,
            json,
        }) => handle_points(&base_dir, &member, caller.as_deref(), json),
        Some(Commands::Category { action }) => handle_category(action, &base_dir),
        Some(Commands::Event { action }) => handle_event(action, &base_dir),
        Some(Commands::Member { action }) => handle_member(action, &base_dir),
        Some(Commands::Exception { action }) => handle_exception(action, &base_dir),
        Some(Commands::Record { action }) => handle_record(action, &base_dir),
        Some(Commands::Config { action }) => handle_config(action, &base_dir),
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(())
        }
        None => {
            Cli::command().print_help().ok();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_integrity() {
                error!(error = %e, "data integrity violation");
            }
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// RUST_LOG wins; otherwise --verbose/--quiet, then log.level from config
fn init_tracing(base_dir: &Path, verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug".to_string()
    } else if quiet {
        "error".to_string()
    } else {
        Config::load(base_dir)
            .map(|c| c.log.level)
            .unwrap_or_else(|_| pointbook_core::config::DEFAULT_LOG_LEVEL.to_string())
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "pointbook", &mut io::stdout());
}

fn resolve_base_dir(cli_base: Option<PathBuf>) -> PathBuf {
    if let Some(base) = cli_base {
        return base;
    }

    if let Ok(base) = std::env::var("POINTBOOK_BASE") {
        return PathBuf::from(base);
    }

    Config::default_base_dir().unwrap_or_else(|_| PathBuf::from(".pointbook"))
}

fn open_store(base_dir: &Path) -> Result<JsonFileStore> {
    let config = Config::load(base_dir)?;
    JsonFileStore::open(base_dir, &config.store.file)
}

fn handle_points(base_dir: &Path, member: &str, caller: Option<&str>, json: bool) -> Result<()> {
    let mut store = open_store(base_dir)?;
    let mut engine = PointsEngine::new(&mut store);
    let member_id = MemberId::from(member);

    let points = match caller {
        Some(caller) => {
            engine.compute_points_as(&PermissionPolicy, &MemberId::from(caller), &member_id)?
        }
        None => {
            debug!(member = %member_id, "no caller given, showing points with officer access");
            engine.compute_points(&member_id)?
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&points)?);
    } else {
        print_points(&member_id, &points);
    }
    Ok(())
}

fn print_points(member_id: &MemberId, points: &HierarchyResult) {
    println!();
    println!("Points for {}:", member_id.to_string().cyan());
    println!();

    if points.is_empty() {
        println!("No categories defined.");
        return;
    }

    for (name, root) in points.iter() {
        println!(
            "  {:<24} {}",
            name.bold(),
            progress(root.received, root.required)
        );
        for (sub_name, sub) in &root.sub_categories {
            println!(
                "    {:<22} {}",
                sub_name,
                progress(sub.received, sub.required)
            );
        }
    }
    println!();
}

fn progress(received: f64, required: i64) -> String {
    let text = format!("{:>6.1} / {}", received, required);
    if received >= required as f64 {
        text.green().to_string()
    } else {
        text.yellow().to_string()
    }
}

fn requirement_label(value: Option<i64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn handle_category(action: CategoryAction, base_dir: &Path) -> Result<()> {
    let mut store = open_store(base_dir)?;
    let mut categories = CategoryStore::new(&mut store);

    match action {
        CategoryAction::List => {
            let forest = categories.list_tree()?;
            println!();
            if forest.is_empty() {
                println!("No categories defined.");
            }
            for node in &forest.roots {
                let cat = &node.category;
                println!(
                    "{}  standard={} reduced={}",
                    cat.name.cyan(),
                    requirement_label(cat.standard_requirement),
                    requirement_label(cat.reduced_requirement)
                );
                for child in &node.children {
                    println!(
                        "  └── {}  standard={} reduced={}",
                        child.name,
                        requirement_label(child.standard_requirement),
                        requirement_label(child.reduced_requirement)
                    );
                }
            }
            println!();
        }
        CategoryAction::Add {
            name,
            parent,
            standard,
            reduced,
        } => {
            let mut category = categories.upsert(&name, parent.as_deref())?;
            if standard.is_some() || reduced.is_some() {
                category = categories.set_requirements(&category.name, standard, reduced)?;
            }
            println!("{} {}", "Saved:".green(), category.name);
        }
        CategoryAction::Set {
            name,
            standard,
            reduced,
        } => {
            let category = categories.set_requirements(&name, standard, reduced)?;
            println!(
                "{} {} standard={} reduced={}",
                "Updated:".green(),
                category.name,
                requirement_label(category.standard_requirement),
                requirement_label(category.reduced_requirement)
            );
        }
        CategoryAction::Remove { name } => {
            let category = categories.delete(&name)?;
            println!("{} {}", "Removed:".green(), category.name);
        }
    }

    Ok(())
}

fn handle_event(action: EventAction, base_dir: &Path) -> Result<()> {
    let mut store = open_store(base_dir)?;
    let mut events = EventBook::new(&mut store);

    match action {
        EventAction::List { category } => {
            let list = events.list(category.as_deref())?;
            println!();
            if list.is_empty() {
                println!("No events found.");
            }
            for event in list {
                println!(
                    "{}  {}  ({})",
                    event.date.format("%m/%d/%Y"),
                    event.name.cyan(),
                    event.category
                );
            }
            println!();
        }
        EventAction::Add {
            name,
            date,
            category,
        } => {
            let event = events.create(&name, date, &category)?;
            println!("{} {} on {}", "Created:".green(), event.name, event.date);
        }
        EventAction::Update {
            name,
            rename,
            date,
            category,
        } => {
            let event = events.update(
                &name,
                EventUpdate {
                    name: rename,
                    date,
                    category,
                },
            )?;
            println!("{} {} on {}", "Updated:".green(), event.name, event.date);
        }
        EventAction::Remove { name } => {
            let event = events.delete(&name)?;
            println!("{} {}", "Removed:".green(), event.name);
        }
    }

    Ok(())
}

fn handle_member(action: MemberAction, base_dir: &Path) -> Result<()> {
    let config = Config::load(base_dir)?;
    let mut store = JsonFileStore::open(base_dir, &config.store.file)?;
    let mut registry = MemberRegistry::new(&mut store);

    match action {
        MemberAction::List { filter } => {
            let members = registry.list(filter)?;
            println!();
            if members.is_empty() {
                println!("No members found.");
            }
            for member in members {
                let status = if member.active {
                    "active".green()
                } else {
                    "inactive".dimmed()
                };
                println!(
                    "{}  {}  {}  [{}]",
                    member.id.to_string().cyan(),
                    member.display_name(),
                    member.tier,
                    status
                );
            }
            println!();
        }
        MemberAction::Add {
            id,
            first,
            last,
            tier,
        } => {
            let tier = tier.unwrap_or(config.members.default_tier);
            let member = registry.register(Member::new(id, tier).with_name(first, last))?;
            println!(
                "{} {} ({})",
                "Registered:".green(),
                member.display_name(),
                member.id
            );
        }
        MemberAction::Show { id } => {
            let member = registry.get(&MemberId::from(id))?;
            print_member(&member);
        }
        MemberAction::Tier { id, tier } => {
            let member = registry.set_tier(&MemberId::from(id), tier)?;
            println!("{} {} is {}", "Updated:".green(), member.id, member.tier);
        }
        MemberAction::Activate { id } => {
            let member = registry.set_active(&MemberId::from(id), true)?;
            println!("{} {}", "Activated:".green(), member.id);
        }
        MemberAction::Deactivate { id } => {
            let member = registry.set_active(&MemberId::from(id), false)?;
            println!("{} {}", "Deactivated:".green(), member.id);
        }
        MemberAction::Grant { id, permission } => {
            let member = registry.grant(&MemberId::from(id), permission)?;
            println!("{} {} to {}", "Granted:".green(), permission, member.id);
        }
        MemberAction::Revoke { id, permission } => {
            let member = registry.revoke(&MemberId::from(id), permission)?;
            println!("{} {} from {}", "Revoked:".green(), permission, member.id);
        }
    }

    Ok(())
}

fn print_member(member: &Member) {
    let permissions: Vec<_> = member.permissions.iter().map(|p| p.as_str()).collect();

    println!();
    println!("{}", member.display_name().bold());
    println!("  id:          {}", member.id);
    println!("  tier:        {}", member.tier);
    println!("  active:      {}", member.active);
    println!("  permissions: {}", permissions.join(", "));
    if !member.exceptions.is_empty() {
        println!("  exceptions:");
        for (i, exc) in member.exceptions.iter().enumerate() {
            println!("    [{}] {} = {}", i, exc.category, exc.points_needed);
        }
    }
    println!();
}

fn handle_exception(action: ExceptionAction, base_dir: &Path) -> Result<()> {
    let mut store = open_store(base_dir)?;

    match action {
        ExceptionAction::List { member } => {
            let exceptions = MemberRegistry::new(&mut store).exceptions(&MemberId::from(member))?;
            println!();
            if exceptions.is_empty() {
                println!("No exceptions.");
            }
            for (i, exc) in exceptions.iter().enumerate() {
                println!("[{}] {} = {}", i, exc.category.cyan(), exc.points_needed);
            }
            println!();
        }
        ExceptionAction::Set {
            member,
            category,
            points,
        } => {
            if CategoryStore::new(&mut store)
                .find_by_name(&category)?
                .is_none()
            {
                return Err(PointbookError::CategoryNotFound { name: category });
            }
            let member_id = MemberId::from(member);
            let index =
                MemberRegistry::new(&mut store).set_exception(&member_id, &category, points)?;
            println!(
                "{} [{}] {} = {} for {}",
                "Saved:".green(),
                index,
                category,
                points,
                member_id
            );
        }
        ExceptionAction::Remove { member, index } => {
            let removed =
                MemberRegistry::new(&mut store).remove_exception(&MemberId::from(member), index)?;
            println!("{} {}", "Removed:".green(), removed.category);
        }
    }

    Ok(())
}

fn handle_record(action: RecordAction, base_dir: &Path) -> Result<()> {
    let mut store = open_store(base_dir)?;
    let mut records = RecordBook::new(&mut store);

    match action {
        RecordAction::List { member, event } => {
            let filter = RecordFilter {
                member: member.map(MemberId::from),
                event,
            };
            let list = records.list(&filter)?;
            println!();
            if list.is_empty() {
                println!("No records found.");
            }
            for record in list {
                println!(
                    "{}  {}  {:.1}  ({})",
                    record.member_id.to_string().cyan(),
                    record.event_name,
                    record.points_earned,
                    record.category
                );
            }
            println!();
        }
        RecordAction::Set {
            member,
            event,
            points,
        } => {
            let record = records.set_points(&MemberId::from(member), &event, points)?;
            println!(
                "{} {} earned {} at {}",
                "Saved:".green(),
                record.member_id,
                record.points(),
                record.event_name
            );
        }
    }

    Ok(())
}

fn handle_config(action: ConfigAction, base_dir: &Path) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load(base_dir)?;
            match config.get(&key) {
                Some(value) => {
                    println!("{}", value);
                }
                None => {
                    return Err(PointbookError::ConfigKeyNotFound { key });
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(base_dir)?;
            config.set(&key, &value)?;
            config.save(base_dir)?;
            println!("{} {} = {}", "Set:".green(), key, value);
        }
        ConfigAction::List => {
            let config = Config::load(base_dir)?;
            println!();
            for (key, value) in config.list() {
                println!("{} = {}", key.cyan(), value);
            }
            println!();
        }
        ConfigAction::Path => {
            let path = Config::path(base_dir);
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            let path = Config::init(base_dir)?;
            println!("{} {}", "Initialized:".green(), path.display());
        }
    }

    Ok(())
}
