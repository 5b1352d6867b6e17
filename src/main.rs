use anyhow::{anyhow, Result};
use blogroll::build::build_site;
use blogroll::comment::{Comment, CommentClient};
use blogroll::config::{Config, Endpoint};
use blogroll::newsletter::Subscriber;
use blogroll::notice::{Notice, NoticeBoard, NoticeKind};
use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_VAR: &str = "BLOGROLL_LOG";

fn main() -> Result<()> {
    let project_dir = Arg::with_name("PROJECT_DIR")
        .help("The project directory, or any directory beneath it")
        .default_value(".");
    let matches = App::new("blogroll")
        .version(crate_version!())
        .about("Builds a tag-paginated blog")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .global(true)
                .help("Logs debug output"),
        )
        .subcommand(
            SubCommand::with_name("build")
                .about("Builds the site into the output directory")
                .arg(project_dir.clone())
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .takes_value(true)
                        .value_name("OUTPUT")
                        .help("The output directory (defaults to `_site`)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("comment")
                .about("Submits a comment on a post")
                .arg(required("slug"))
                .arg(required("name"))
                .arg(required("message"))
                .arg(project_dir.clone()),
        )
        .subcommand(
            SubCommand::with_name("subscribe")
                .about("Subscribes an email address to the newsletter")
                .arg(Arg::with_name("EMAIL").required(true).index(1))
                .arg(project_dir.index(2)),
        )
        .get_matches();

    let verbose = matches.is_present("verbose")
        || matches
            .subcommand()
            .1
            .map_or(false, |args| args.is_present("verbose"));
    init_logging(verbose);

    match matches.subcommand() {
        ("build", Some(args)) => build(args),
        ("comment", Some(args)) => comment(args),
        ("subscribe", Some(args)) => subscribe(args),
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn required(name: &'static str) -> Arg<'static, 'static> {
    Arg::with_name(name)
        .long(name)
        .takes_value(true)
        .required(true)
}

fn init_logging(verbose: bool) {
    let filter = match EnvFilter::try_from_env(LOG_VAR) {
        Ok(filter) if !verbose => filter,
        _ => EnvFilter::new(if verbose { "debug" } else { "info" }),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load(args: &ArgMatches, output: Option<&Path>) -> Result<Config> {
    let dir = PathBuf::from(args.value_of("PROJECT_DIR").unwrap_or("."));
    Config::from_directory(&dir, output)
}

fn build(args: &ArgMatches) -> Result<()> {
    let output = args.value_of("output").map(PathBuf::from);
    let config = load(args, output.as_deref())?;
    let summary = build_site(&config)?;
    info!(
        posts = summary.posts,
        tags = summary.tags,
        comments = summary.comments,
        pages = summary.pages,
        "built site"
    );
    Ok(())
}

fn comment(args: &ArgMatches) -> Result<()> {
    let config = load(args, None)?;
    let endpoint = configured(config.comments, "comments")?;
    let comment = Comment {
        slug: args.value_of("slug").unwrap_or_default().to_owned(),
        name: args.value_of("name").unwrap_or_default().to_owned(),
        message: args.value_of("message").unwrap_or_default().to_owned(),
    };
    let board = NoticeBoard::new(endpoint.dismiss_after);
    let client = CommentClient::new(endpoint.url)?;
    let notice = runtime()?.block_on(async { client.submit(&comment, &board).await });
    report(notice)
}

fn subscribe(args: &ArgMatches) -> Result<()> {
    let config = load(args, None)?;
    let endpoint = configured(config.newsletter, "newsletter")?;
    let email = args.value_of("EMAIL").unwrap_or_default().to_owned();
    let board = NoticeBoard::new(endpoint.dismiss_after);
    let subscriber = Subscriber::new(endpoint.url)?;
    let notice = runtime()?.block_on(async { subscriber.subscribe(&email, &board).await });
    report(notice)
}

fn configured(endpoint: Option<Endpoint>, section: &str) -> Result<Endpoint> {
    endpoint.ok_or_else(|| {
        anyhow!(
            "No `{}` endpoint is configured in the project file",
            section
        )
    })
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

// Success notices go to stdout; error notices fail the command.
fn report(notice: Notice) -> Result<()> {
    match notice.kind {
        NoticeKind::Success => {
            println!("{}", notice.message);
            Ok(())
        }
        NoticeKind::Error => Err(anyhow!(notice.message)),
    }
}
