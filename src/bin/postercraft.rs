use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use postercraft::output::social::{SocialPlatform, SocialTarget, share_target};
use postercraft::{
    ComposeOpts, Compositor, FileDispatcher, FrameShape, ImageSource, OutputDispatcher,
    PosterRequest, SUGGESTED_MESSAGES, ShareOutcome, TemplateCatalog, TemplateSelector,
};

#[derive(Parser, Debug)]
#[command(name = "postercraft", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose a poster and deliver it.
    Render(RenderArgs),
    /// Print the suggested overlay messages.
    Presets,
    /// Print social share links for a template.
    Links(LinksArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Action {
    /// Write the PNG into the output directory.
    Save,
    /// Put the poster on the system clipboard.
    Copy,
    /// Share, falling back to clipboard and then to a file.
    Share,
}

#[derive(Parser, Debug)]
struct TemplateArgs {
    /// Template name.
    #[arg(long, default_value = "poster1")]
    template: String,

    /// Template catalog JSON (defaults to the built-in posters).
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Directory holding `templates/poster1.png` and `templates/poster2.png`.
    #[arg(long, default_value = "assets")]
    assets_root: PathBuf,
}

impl TemplateArgs {
    fn catalog(&self) -> anyhow::Result<TemplateCatalog> {
        match &self.catalog {
            Some(path) => TemplateCatalog::from_path(path)
                .with_context(|| format!("load catalog '{}'", path.display())),
            None => Ok(TemplateCatalog::builtin(&self.assets_root)),
        }
    }
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// User photo: file path or `data:` URL.
    #[arg(long)]
    user: String,

    /// Clip shape for the photo.
    #[arg(long, default_value = "square")]
    frame: FrameShape,

    /// Overlay message (at most 150 characters).
    #[arg(long)]
    message: Option<String>,

    #[command(flatten)]
    template: TemplateArgs,

    /// Download directory.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// What to do with the finished poster.
    #[arg(long, value_enum, default_value_t = Action::Save)]
    action: Action,

    /// Per-load timeout in milliseconds (overrides POSTERCRAFT_LOAD_TIMEOUT_MS).
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Print the outcome as JSON on stdout.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug)]
struct LinksArgs {
    #[command(flatten)]
    template: TemplateArgs,

    /// Campaign page linked from the share intents.
    #[arg(long, default_value = "https://gdg.community.dev/")]
    site_url: url::Url,
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args).await,
        Command::Presets => {
            for m in SUGGESTED_MESSAGES {
                println!("{m}");
            }
            Ok(())
        }
        Command::Links(args) => cmd_links(args),
    }
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let catalog = args.template.catalog()?;
    let mut opts = ComposeOpts::from_env();
    if let Some(ms) = args.timeout_ms {
        opts = opts.with_load_timeout(Duration::from_millis(ms));
    }

    let user: ImageSource = args.user.parse()?;
    let req = PosterRequest::new(
        user,
        args.frame,
        args.message,
        TemplateSelector::new(args.template.template),
    )?;

    let compositor = Compositor::new(catalog, opts);
    let template = compositor.catalog().get(req.template())?;
    let poster = compositor
        .compose_with(template, &req)
        .await
        .context("compose poster")?;

    let outcome = match args.action {
        Action::Save => {
            let files = FileDispatcher::new(&args.out_dir);
            ShareOutcome::Download {
                path: files.download(&poster, &template.campaign_prefix)?,
            }
        }
        Action::Copy => {
            postercraft::probe_dispatcher(&args.out_dir).copy_to_clipboard(&poster)?;
            ShareOutcome::Clipboard
        }
        Action::Share => {
            let dispatcher = postercraft::probe_dispatcher(&args.out_dir);
            postercraft::share_with_fallback(dispatcher.as_ref(), &poster, template)?
        }
    };

    if args.json {
        let line = serde_json::json!({
            "outcome": outcome,
            "path": outcome.path(),
            "width": poster.width(),
            "height": poster.height(),
        });
        println!("{line}");
    } else if let Some(path) = outcome.path() {
        println!("{}", path.display());
    }
    eprintln!("{}", outcome.confirmation());
    Ok(())
}

fn cmd_links(args: LinksArgs) -> anyhow::Result<()> {
    let catalog = args.template.catalog()?;
    let template = catalog.get(&TemplateSelector::new(args.template.template.as_str()))?;
    for platform in SocialPlatform::ALL {
        match share_target(platform, &template.share, &args.site_url)? {
            SocialTarget::Url(url) => println!("{}\t{url}", platform.label()),
            SocialTarget::Clipboard { hint } => println!("{}\t{hint}", platform.label()),
        }
    }
    Ok(())
}
