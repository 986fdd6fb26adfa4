// Native binary for otcmarket - terminal client

use anyhow::{anyhow, bail, Context, Result};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use otcmarket::{
    api::HttpMarketApi,
    config::{self, CliArgs, Command},
    debug,
    host::StaticHost,
    notify::Severity,
    source_api::run_api_worker,
    types::AppEvent,
    util::Instant,
    view, App, UiSnapshot,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    debug::init_once();

    let (cfg, args) = config::load().context("Failed to load configuration")?;
    if log::log_enabled!(log::Level::Debug) {
        cfg.print_summary();
    }

    let api = HttpMarketApi::new(&cfg)?;
    let (request_tx, request_rx) = unbounded_channel();
    let (event_tx, event_rx) = unbounded_channel::<AppEvent>();

    let host = StaticHost::new(config::cli_user(&args));
    let app = App::new(Box::new(host), Some(request_tx), cfg.per_page);

    // The driver owns the App; dropping it closes the request channel and
    // lets the worker drain and exit.
    let (_, outcome) = tokio::join!(
        run_api_worker(&api, request_rx, event_tx),
        drive(app, event_rx, &args)
    );
    outcome
}

/// Wait for `n` events and feed them to the core.
async fn pump(app: &mut App, rx: &mut UnboundedReceiver<AppEvent>, n: usize) -> Result<()> {
    for _ in 0..n {
        let ev = rx
            .recv()
            .await
            .ok_or_else(|| anyhow!("request worker stopped unexpectedly"))?;
        app.on_event(ev);
    }
    Ok(())
}

/// First error banner raised so far, as a process failure.
fn fail_on_error(app: &App) -> Result<()> {
    let now = Instant::now();
    match app.notifications(now).find(|n| n.severity == Severity::Error) {
        Some(n) => bail!("{}", n.message),
        None => Ok(()),
    }
}

async fn drive(mut app: App, mut rx: UnboundedReceiver<AppEvent>, args: &CliArgs) -> Result<()> {
    // Categories request
    app.start();
    pump(&mut app, &mut rx, 1).await?;

    match &args.command {
        Command::Categories => {}
        Command::Search {
            search,
            category,
            page,
        } => {
            app.set_filters(search.clone(), category.clone());
            app.search_page(*page);
            pump(&mut app, &mut rx, 1).await?;
        }
        Command::Show { id } => {
            app.view_listing(id);
            pump(&mut app, &mut rx, 1).await?;
        }
        Command::Contact { id, message } => {
            app.view_listing(id);
            pump(&mut app, &mut rx, 1).await?;
            fail_on_error(&app)?;

            let now = Instant::now();
            app.contact_seller(now);
            app.send_message(message, now);
            if app.contact_sending() {
                pump(&mut app, &mut rx, 1).await?;
            }
        }
    }

    if args.json {
        let snap = UiSnapshot::from_app(&app, Instant::now());
        println!("{}", serde_json::to_string_pretty(&snap)?);
    } else {
        print_text(&app, &args.command);
    }
    fail_on_error(&app)?;

    let now = Instant::now();
    if let Some(w) = app.notifications(now).find(|n| n.severity == Severity::Warning) {
        bail!("{}", w.message);
    }
    Ok(())
}

fn print_text(app: &App, command: &Command) {
    match command {
        Command::Categories => {
            for c in app.categories() {
                match &c.description {
                    Some(d) => println!("{}\t{}", c.name, d),
                    None => println!("{}", c.name),
                }
            }
        }
        Command::Search { .. } => {
            for group in app.groups() {
                println!("{}\n", view::category_section(group).to_text());
            }
            if let Some(page) = app.page_info() {
                let pages = page.pages.map(|p| p.to_string()).unwrap_or_else(|| "?".into());
                let more = if page.has_next { " (more)" } else { "" };
                println!("page {}/{pages}{more}", page.current_page);
            }
        }
        Command::Show { .. } => {
            if let Some(listing) = app.current_listing() {
                println!("{}", listing.title);
                for node in view::listing_detail(listing) {
                    println!("{}", node.to_text());
                }
            }
        }
        Command::Contact { .. } => {
            let now = Instant::now();
            for n in app.notifications(now) {
                if n.severity == Severity::Success {
                    println!("{}", n.message);
                }
            }
        }
    }
}
