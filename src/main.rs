use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::{Args, Parser, Subcommand, ValueEnum};
use portfolio_admin::app::App;
use portfolio_admin::content::ContentService;
use portfolio_admin::editor::{parse_features, AboutEdit, EntityEdit, HeroEdit, StatEdit};
use portfolio_admin::models::{
    Award, Config, EntityKind, GalleryQuery, HeroStat, NewBadge, Service,
};
use portfolio_admin::orchestrator::Slot;
use portfolio_admin::session::AdminSession;
use portfolio_admin::upload::UploadFile;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "portfolio-admin")]
#[command(about = "Manage portfolio site content and images")]
struct CliArgs {
    /// Content API root, e.g. https://example.com/api
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Where the operator session is persisted.
    #[arg(long, global = true, value_name = "PATH")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    /// Report whether the stored session passes the gate.
    Status,
    /// Re-read all content and print a summary.
    Refresh,
    /// Upload an image and attach it to a record.
    Upload {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long, value_enum)]
        slot: SlotKind,
        /// Service or award id for the `service` and `award` slots.
        #[arg(long)]
        target_id: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        title: Option<String>,
    },
    #[command(subcommand)]
    Gallery(GalleryCommand),
    #[command(subcommand)]
    Service(EntityCommand),
    #[command(subcommand)]
    Award(EntityCommand),
    #[command(subcommand)]
    About(AboutCommand),
    #[command(subcommand)]
    Hero(HeroCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SlotKind {
    Hero,
    About,
    Profile,
    Gallery,
    Service,
    Award,
}

#[derive(Debug, Subcommand)]
enum GalleryCommand {
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    Delete { id: String },
    /// Print the newest photo in the `profile` category.
    Profile,
}

#[derive(Debug, Subcommand)]
enum EntityCommand {
    List,
    Create(CreateEntity),
    /// Change text fields; anything not given is kept.
    Update(UpdateEntity),
    Delete { id: String },
    SetMain { id: String, url: String },
    RemoveImage { id: String, url: String },
}

#[derive(Debug, Args)]
struct CreateEntity {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    /// Comma-separated feature list (services only).
    #[arg(long, default_value = "")]
    features: String,
    /// Awarding organization (awards only).
    #[arg(long)]
    organization: Option<String>,
    /// Award year; defaults to the current year.
    #[arg(long)]
    year: Option<i32>,
}

#[derive(Debug, Args)]
struct UpdateEntity {
    id: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Services only.
    #[arg(long)]
    icon: Option<String>,
    /// Comma-separated; replaces the whole list (services only).
    #[arg(long)]
    features: Option<String>,
    #[arg(long)]
    organization: Option<String>,
    #[arg(long)]
    year: Option<i32>,
    #[arg(long)]
    category: Option<String>,
}

impl From<UpdateEntity> for EntityEdit {
    fn from(args: UpdateEntity) -> Self {
        EntityEdit {
            title: args.title,
            description: args.description,
            icon: args.icon,
            features: args.features.as_deref().map(parse_features),
            organization: args.organization,
            year: args.year,
            category: args.category,
        }
    }
}

#[derive(Debug, Subcommand)]
enum AboutCommand {
    /// Change text fields; anything not given is kept.
    Set {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        position: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        section_title: Option<String>,
        #[arg(long)]
        image_aspect_ratio: Option<String>,
    },
    AddBadge {
        #[arg(long)]
        title: String,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long)]
        position: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    DeleteBadge { id: String },
    ClearImage,
}

#[derive(Debug, Subcommand)]
enum HeroCommand {
    Show,
    Set {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        subtitle: Option<String>,
        #[arg(long)]
        cta_text: Option<String>,
    },
    AddStat {
        #[arg(long)]
        number: String,
        #[arg(long)]
        text: String,
        #[arg(long)]
        icon: Option<String>,
    },
    /// INDEX is the zero-based position shown by `hero show`.
    EditStat {
        index: usize,
        #[arg(long)]
        number: Option<String>,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    RemoveStat { index: usize },
    ClearImage,
}

fn parse_slot(
    kind: SlotKind,
    target_id: Option<String>,
    category: Option<String>,
    title: Option<String>,
) -> std::result::Result<Slot, String> {
    let require_target = |what: &str| {
        target_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| format!("--target-id is required for the {} slot", what))
    };

    Ok(match kind {
        SlotKind::Hero => Slot::Hero,
        SlotKind::About => Slot::About,
        SlotKind::Profile => Slot::Profile,
        SlotKind::Gallery => Slot::gallery(category, title),
        SlotKind::Service => Slot::ServiceImage {
            service_id: require_target("service")?,
            title,
        },
        SlotKind::Award => Slot::AwardImage {
            award_id: require_target("award")?,
            title,
        },
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_config(args: &CliArgs) -> Result<Config> {
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(url) = &args.api_url {
        config = config.with_content_api_url(url);
    }
    if let Some(path) = &args.session_file {
        config.session_file = path.clone();
    }
    Ok(config)
}

async fn run(args: CliArgs) -> Result<()> {
    let config = load_config(&args)?;
    let app = App::new(&config)?;

    let session = match &args.command {
        Command::Login { username, password } => {
            app.gate().login(username, password).await?;
            println!("Logged in");
            return Ok(());
        }
        Command::Logout => {
            app.gate().logout()?;
            println!("Logged out");
            return Ok(());
        }
        Command::Status => {
            if app.gate().check_authentication() {
                println!("authenticated");
            } else {
                println!("not authenticated");
            }
            return Ok(());
        }
        _ => app.admit()?,
    };

    match args.command {
        Command::Login { .. } | Command::Logout | Command::Status => {}
        Command::Refresh => {
            let snapshot = app.refresh(&session).await;
            println!("hero image: {}", snapshot.hero.image.as_deref().unwrap_or("-"));
            println!("about image: {}", snapshot.about.image.as_deref().unwrap_or("-"));
            println!("services: {}", snapshot.services.len());
            println!("awards: {}", snapshot.awards.len());
            println!("gallery items: {}", snapshot.gallery.len());
        }
        Command::Upload {
            file,
            slot,
            target_id,
            category,
            title,
        } => {
            let slot = parse_slot(slot, target_id, category, title).map_err(anyhow::Error::msg)?;
            let file = UploadFile::open(&file, app.max_upload_bytes()).await?;

            let mut orchestrator = app.orchestrator(&session);
            let mut progress = orchestrator.progress();
            let progress_task = tokio::spawn(async move {
                while progress.changed().await.is_ok() {
                    let percent = *progress.borrow_and_update();
                    info!("Upload progress: {}%", percent);
                }
            });

            let result = orchestrator.submit(&file, slot).await;
            progress_task.abort();
            println!("{}", result?);
        }
        Command::Gallery(GalleryCommand::List { category, limit }) => {
            let query = match category {
                Some(category) if category != "all" => GalleryQuery::category(category, limit),
                _ => GalleryQuery {
                    category: None,
                    limit,
                },
            };
            print_json(&app.content(&session).list_gallery(&query).await?)?;
        }
        Command::Gallery(GalleryCommand::Delete { id }) => {
            app.editor(&session).delete_gallery_item(&id).await?;
        }
        Command::Gallery(GalleryCommand::Profile) => {
            match app.editor(&session).profile_image().await? {
                Some(url) => println!("{}", url),
                None => println!("no profile photo"),
            }
        }
        Command::Service(command) => run_entity(&app, &session, EntityKind::Service, command).await?,
        Command::Award(command) => run_entity(&app, &session, EntityKind::Award, command).await?,
        Command::About(AboutCommand::AddBadge {
            title,
            icon,
            position,
            color,
        }) => {
            let mut badge = NewBadge::new(&title)?;
            if let Some(icon) = icon {
                badge.icon = icon;
            }
            if let Some(position) = position {
                badge.position = position;
            }
            if let Some(color) = color {
                badge.color = color;
            }
            app.editor(&session).add_badge(badge).await?;
        }
        Command::About(AboutCommand::Set {
            title,
            position,
            bio,
            section_title,
            image_aspect_ratio,
        }) => {
            let edit = AboutEdit {
                title,
                position,
                bio,
                section_title,
                image_aspect_ratio,
            };
            print_json(&app.editor(&session).update_about(edit).await?)?;
        }
        Command::About(AboutCommand::DeleteBadge { id }) => {
            app.editor(&session).delete_badge(&id).await?;
        }
        Command::About(AboutCommand::ClearImage) => {
            app.editor(&session).clear_about_image().await?;
        }
        Command::Hero(HeroCommand::Show) => {
            print_json(&app.content(&session).get_hero().await?)?;
        }
        Command::Hero(HeroCommand::Set {
            title,
            subtitle,
            cta_text,
        }) => {
            let edit = HeroEdit {
                title,
                subtitle,
                cta_text,
            };
            print_json(&app.editor(&session).update_hero(edit).await?)?;
        }
        Command::Hero(HeroCommand::AddStat { number, text, icon }) => {
            let stat = HeroStat { number, text, icon };
            print_json(&app.editor(&session).add_hero_stat(stat).await?.stats)?;
        }
        Command::Hero(HeroCommand::EditStat {
            index,
            number,
            text,
            icon,
        }) => {
            let edit = StatEdit { number, text, icon };
            print_json(&app.editor(&session).update_hero_stat(index, edit).await?.stats)?;
        }
        Command::Hero(HeroCommand::RemoveStat { index }) => {
            print_json(&app.editor(&session).remove_hero_stat(index).await?.stats)?;
        }
        Command::Hero(HeroCommand::ClearImage) => {
            app.editor(&session).clear_hero_image().await?;
        }
    }

    Ok(())
}

async fn run_entity(
    app: &App,
    session: &AdminSession,
    kind: EntityKind,
    command: EntityCommand,
) -> Result<()> {
    let editor = app.editor(session);

    match command {
        EntityCommand::List => match kind {
            EntityKind::Service => print_json(&app.content(session).list_services().await?)?,
            EntityKind::Award => print_json(&app.content(session).list_awards().await?)?,
        },
        EntityCommand::Create(create) => match kind {
            EntityKind::Service => {
                let draft = Service::draft(
                    &create.title,
                    &create.description,
                    parse_features(&create.features),
                );
                print_json(&editor.create_service(draft).await?)?;
            }
            EntityKind::Award => {
                let year = create.year.unwrap_or_else(|| Local::now().year());
                let draft =
                    Award::draft(&create.title, create.organization, year, &create.description);
                print_json(&editor.create_award(draft).await?)?;
            }
        },
        EntityCommand::Update(update) => {
            let id = update.id.clone();
            editor.update_entity(kind, &id, update.into()).await?;
        }
        EntityCommand::Delete { id } => editor.delete_entity(kind, &id).await?,
        EntityCommand::SetMain { id, url } => editor.set_main_image(kind, &id, &url).await?,
        EntityCommand::RemoveImage { id, url } => {
            if !editor.remove_entity_image(kind, &id, &url).await? {
                println!("{} {} has no image {}", kind, id, url);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_admin=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
