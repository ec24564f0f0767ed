use chrono::Utc;
use clap::Subcommand;

use focuslock_core::{
    Config, ControllerOptions, LocalTransport, MemoryFullscreen, PopupController, Section,
    SessionController, SessionState, VisibilityFlags,
};

use crate::terminal::TerminalPage;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run a focus session in the terminal until it expires
    Run {
        /// Session duration in minutes (1-60)
        #[arg(long)]
        minutes: Option<u32>,
        /// Comma-separated sections to hide (editorial,solutions,submissions,discussion)
        #[arg(long, value_delimiter = ',')]
        hide: Option<Vec<String>>,
        /// Enforce fullscreen and key blocking for the session
        #[arg(long)]
        restricted: bool,
    },
    /// Send a single start request and print the resulting events
    Start {
        /// Session duration in minutes (1-60)
        #[arg(long)]
        minutes: Option<u32>,
        /// Comma-separated sections to hide (editorial,solutions,submissions,discussion)
        #[arg(long, value_delimiter = ',')]
        hide: Option<Vec<String>>,
        /// Enforce fullscreen and key blocking for the session
        #[arg(long)]
        restricted: bool,
    },
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    match action {
        SessionAction::Start {
            minutes,
            hide,
            restricted,
        } => {
            let mut transport = build_transport(&config, restricted);
            let popup = build_popup(&config, minutes, hide.as_deref())?;
            start(popup, &mut transport)?;
            let snapshot = transport.controller().snapshot();
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            Ok(())
        }
        SessionAction::Run {
            minutes,
            hide,
            restricted,
        } => {
            let mut transport = build_transport(&config, restricted);
            let popup = build_popup(&config, minutes, hide.as_deref())?;
            start(popup, &mut transport)?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()?;
            runtime.block_on(drive_to_expiry(&mut transport));
            Ok(())
        }
    }
}

fn build_transport(
    config: &Config,
    restricted: bool,
) -> LocalTransport<TerminalPage, MemoryFullscreen> {
    let options = ControllerOptions {
        restricted: restricted || config.session.restricted,
        ..config.controller_options()
    };
    LocalTransport::new(SessionController::with_options(
        TerminalPage::new(),
        MemoryFullscreen::new(),
        options,
    ))
}

fn build_popup(
    config: &Config,
    minutes: Option<u32>,
    hide: Option<&[String]>,
) -> Result<PopupController, Box<dyn std::error::Error>> {
    let mut popup = PopupController::from_config(config);
    if let Some(minutes) = minutes {
        popup.select_minutes(minutes);
    }
    if let Some(names) = hide {
        let mut flags = VisibilityFlags::none();
        for name in names {
            flags.set(name.parse::<Section>()?, true);
        }
        popup.set_switches(flags);
    }
    Ok(popup)
}

fn start(
    mut popup: PopupController,
    transport: &mut LocalTransport<TerminalPage, MemoryFullscreen>,
) -> Result<(), Box<dyn std::error::Error>> {
    let ack = popup.start(transport)?;
    eprintln!("{}", ack.status);
    for event in transport.drain_events() {
        println!("{}", serde_json::to_string_pretty(&event)?);
    }
    Ok(())
}

async fn drive_to_expiry(transport: &mut LocalTransport<TerminalPage, MemoryFullscreen>) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
    // The first tick of a tokio interval fires immediately.
    interval.tick().await;
    loop {
        interval.tick().await;
        let events = transport.controller_mut().tick(Utc::now());
        for event in events {
            if let Ok(json) = serde_json::to_string_pretty(&event) {
                println!("{json}");
            }
        }
        if transport.controller().state() == SessionState::Expired {
            break;
        }
    }
}
