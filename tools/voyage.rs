/// Voyage — play the Straits engine in a terminal.
///
/// Usage: voyage [--data <dir>] [--save <path>] [--seed <n>] [--title <path>]
///
/// Data defaults to $STRAITS_DATA_DIR, then `data/`. The save slot defaults
/// to `saves/slot1.ron`. `--title` points at a text banner shown on startup.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use straits_engine::core::cycle::{EventView, Notice, Presenter};
use straits_engine::core::engine::{DataPaths, EngineError, StraitsEngine};
use straits_engine::schema::location::LocationType;
use straits_engine::schema::player::PlayerState;
use straits_engine::schema::role::Role;
use tracing_subscriber::EnvFilter;

const BANNER: &str = "===================================\n       THE STRAITS PROJECT\n===================================";

struct Options {
    data_dir: PathBuf,
    save: Option<PathBuf>,
    seed: Option<u64>,
    title: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let options = parse_args();

    let mut paths = DataPaths::in_dir(&options.data_dir);
    if let Some(save) = options.save {
        paths.save = save;
    }
    let mut builder = StraitsEngine::builder().data_paths(paths);
    if let Some(seed) = options.seed {
        builder = builder.seed(seed);
    }
    let mut engine = match builder.build() {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    show_title(options.title.as_deref());

    let mut term = Terminal::new();
    loop {
        println!("\n{}", BANNER);
        println!("\n1) Start");
        println!("2) Load ({})", engine.paths().save.display());
        println!("3) Quit");
        let Some(choice) = term.prompt() else {
            break;
        };
        match choice.as_str() {
            "1" => {
                let role = choose_role(&mut term);
                let state = engine.new_game(role);
                println!("\nYou set sail as a {}.", role);
                term.pause();
                run_game(&mut engine, state, &mut term);
            }
            "2" => match engine.load() {
                Ok(Some(state)) => {
                    println!("\nLoaded save from {}.", engine.paths().save.display());
                    term.pause();
                    run_game(&mut engine, state, &mut term);
                }
                Ok(None) => {
                    println!("\nNo save found.");
                    term.pause();
                }
                Err(e) => {
                    println!("\nCould not load save: {}", e);
                    term.pause();
                }
            },
            "3" => break,
            _ => {
                println!("\nInvalid option.");
                term.pause();
            }
        }
    }
    println!("\nGoodbye.");
}

fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options {
        data_dir: std::env::var("STRAITS_DATA_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data")),
        save: None,
        seed: None,
        title: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            "--data" if i + 1 < args.len() => {
                i += 1;
                options.data_dir = PathBuf::from(&args[i]);
            }
            "--save" if i + 1 < args.len() => {
                i += 1;
                options.save = Some(PathBuf::from(&args[i]));
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                match args[i].parse() {
                    Ok(seed) => options.seed = Some(seed),
                    Err(_) => {
                        eprintln!("Invalid seed: {}", args[i]);
                        process::exit(1);
                    }
                }
            }
            "--title" if i + 1 < args.len() => {
                i += 1;
                options.title = Some(PathBuf::from(&args[i]));
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }
    options
}

fn print_usage() {
    println!("Usage: voyage [--data <dir>] [--save <path>] [--seed <n>] [--title <path>]");
}

/// Show the title banner. A missing or unreadable asset never blocks startup.
fn show_title(path: Option<&Path>) {
    let Some(path) = path else {
        return;
    };
    match std::fs::read_to_string(path) {
        Ok(art) => {
            println!("{}", art);
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "title asset unavailable");
        }
    }
}

fn choose_role(term: &mut Terminal) -> Role {
    println!("\nChoose your background:\n");
    for (i, role) in Role::ALL.iter().enumerate() {
        println!("{}) {}", i + 1, role);
    }
    Role::from_menu_choice(&term.prompt().unwrap_or_default())
}

fn run_game(engine: &mut StraitsEngine, mut state: PlayerState, term: &mut Terminal) {
    loop {
        if let Some(reason) = state.game_over() {
            println!("\n{}", reason);
            term.pause();
            return;
        }

        println!("\n{}", state.status_text());
        println!("\nWhat will you do?\n");
        println!("1) Sail on (at sea)");
        println!("2) Make landfall (travel to port/village)");
        println!("3) Check status");
        println!("4) Save");
        println!("5) Quit");
        let Some(choice) = term.prompt() else {
            return;
        };

        let result = match choice.as_str() {
            "1" => engine.sail(&mut state, term).map(|_| ()),
            "2" => match travel_menu(engine, term) {
                Some((name, kind)) => engine
                    .make_landfall(&mut state, &name, kind, term)
                    .map(|_| ()),
                None => {
                    println!("\nYou remain at sea.");
                    Ok(())
                }
            },
            "3" => {
                println!("\n{}", state.status_text());
                Ok(())
            }
            "4" => engine.save(&state).map(|()| {
                println!("\nGame saved to {}.", engine.paths().save.display());
            }),
            "5" => {
                println!("\nFarewell, Captain. Until next voyage.");
                return;
            }
            _ => {
                println!("\nI didn't catch that.");
                Ok(())
            }
        };

        match result {
            Ok(()) => term.pause(),
            Err(EngineError::GameOver(_)) => {}
            Err(e) => {
                println!("\nERROR: {}", e);
                term.pause();
            }
        }
    }
}

fn travel_menu(engine: &StraitsEngine, term: &mut Terminal) -> Option<(String, LocationType)> {
    println!("\nMake landfall:\n");
    println!("1) Major Ports");
    println!("2) Villages");
    println!("3) Cancel");
    let kind = match term.prompt()?.as_str() {
        "1" => LocationType::MajorPort,
        "2" => LocationType::Village,
        _ => return None,
    };

    let names = engine.world().destinations(kind);
    println!("\nChoose destination ({}):\n", kind.label());
    for (i, name) in names.iter().enumerate() {
        println!("{}) {}", i + 1, name);
    }
    println!("{}) Cancel", names.len() + 1);

    let index: usize = term.prompt()?.parse().ok()?;
    let name = names.get(index.checked_sub(1)?)?;
    Some((name.to_string(), kind))
}

/// Line-based terminal presenter.
struct Terminal {
    stdin: io::Stdin,
}

impl Terminal {
    fn new() -> Self {
        Self { stdin: io::stdin() }
    }

    /// Read one trimmed line. `None` at end of input.
    fn prompt(&mut self) -> Option<String> {
        print!("\n> ");
        io::stdout().flush().ok();
        let mut line = String::new();
        match self.stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn pause(&mut self) {
        print!("\n[Enter] to continue...");
        io::stdout().flush().ok();
        let mut line = String::new();
        self.stdin.lock().read_line(&mut line).ok();
    }
}

impl Presenter for Terminal {
    fn choose(&mut self, view: &EventView<'_>) -> Option<String> {
        println!("\n— {} —\n", view.title);
        println!("{}\n", view.description);
        for (key, label) in &view.options {
            println!("{}) {}", key, label);
        }
        self.prompt()
    }

    fn notice(&mut self, notice: &Notice) {
        if let Notice::MissingOptions { description, .. } = notice {
            println!("\n{}\n", description);
        }
        println!("\n{}", notice.message());
    }
}
