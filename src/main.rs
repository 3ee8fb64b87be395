use std::path::PathBuf;

use clap::Parser;
use winit::event_loop::EventLoop;

use gait_lab::application::{Application, ViewerSettings};
use gait_lab::control_state::View;
use gait_lab::error::ViewerResult;
use gait_lab::registry::GaitPhase;
use gait_lab::GaitEvent;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Phase shown at startup: static-stand, heel-strike, midstance or toe-off
    #[arg(long, default_value = "static-stand")]
    phase: GaitPhase,

    /// Start in the simulator or the model gallery
    #[arg(long, default_value = "simulator")]
    view: View,

    #[arg(long, default_value_t = 1600)]
    width: u32,

    #[arg(long, default_value_t = 1000)]
    height: u32,

    /// TrueType font for the text overlay; without it descriptions are logged
    #[arg(long)]
    font: Option<PathBuf>,

    /// Print the force table as JSON and exit
    #[arg(long)]
    dump_forces: bool,
}

impl From<&Args> for ViewerSettings {
    fn from(args: &Args) -> Self {
        Self {
            phase: args.phase,
            view: args.view,
            width: args.width,
            height: args.height,
            font: args.font.clone(),
        }
    }
}

fn main() {
    if let Err(error) = run() {
        log::error!("{error}");
        eprintln!("{error}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn dump_forces() -> ViewerResult<()> {
    let table = gait_lab::forces::force_table();
    println!("{}", serde_json::to_string_pretty(&table)?);
    Ok(())
}

fn run() -> ViewerResult<()> {
    #[cfg(target_arch = "wasm32")]
    {
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));
        if let Err(error) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&wasm_bindgen::JsValue::from_str(&error.to_string()));
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    #[cfg(not(target_arch = "wasm32"))]
    let args = Args::parse();
    #[cfg(target_arch = "wasm32")]
    let args = Args::parse_from(["gait_lab"]);

    #[cfg(not(target_arch = "wasm32"))]
    if args.dump_forces {
        return dump_forces();
    }

    let event_loop = EventLoop::<GaitEvent>::with_user_event().build()?;
    let mut app = Application::new(ViewerSettings::from(&args), event_loop.create_proxy())?;
    log::info!("Starting at {}", args.phase);
    event_loop.run_app(&mut app)?;
    Ok(())
}
