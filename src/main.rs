// Entry point and interactive console flow.
//
// - Option [1] loads and cleans the spreadsheet (cached per path).
// - Option [2] changes the region/state/date filters.
// - Option [3] renders the dashboard tables for the current filters.
// - Option [4] prints the same view as JSON for a chart front end.
// - Option [5] drops the cached data and reloads the file.
use once_cell::sync::Lazy;
use sales_dashboard::config::DashboardConfig;
use sales_dashboard::filter::{self, FilterSelection};
use sales_dashboard::loader::DataLoader;
use sales_dashboard::types::Dataset;
use sales_dashboard::{output, reports};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

static LOADER: Lazy<DataLoader> = Lazy::new(DataLoader::new);

static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        config: DashboardConfig::from_args(std::env::args().skip(1)),
        data: None,
        selection: FilterSelection::default(),
    })
});

struct AppState {
    config: DashboardConfig,
    data: Option<Arc<Dataset>>,
    selection: FilterSelection,
}

fn state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Print `prompt` and read one trimmed line from stdin.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    read_line("Enter choice: ")
}

/// Handle option [1]: load and clean the spreadsheet.
///
/// Any fatal load error leaves the previous state untouched; nothing is
/// rendered from a partial load.
fn handle_load() {
    let path = state().config.source_path.clone();
    match LOADER.load(&path) {
        Ok((data, load_report)) => {
            output::print_load_report(&load_report);
            let mut app = state();
            app.selection.reconcile(&data.records);
            app.data = Some(data);
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

fn handle_reload() {
    let path = state().config.source_path.clone();
    LOADER.invalidate(&path);
    state().data = None;
    handle_load();
}

fn loaded_data() -> Option<Arc<Dataset>> {
    let data = state().data.clone();
    if data.is_none() {
        println!("Error: No data loaded. Please load the file first (option 1).\n");
    }
    data
}

/// Handle option [2]: walk through the sidebar filters.
fn handle_filters() {
    let Some(data) = loaded_data() else {
        return;
    };
    let mut selection = FilterSelection::default();

    let regions = filter::region_options(&data.records);
    println!("Regions: Todas, {}", regions.join(", "));
    selection = selection.with_region(&read_line("Region [Todas]: "));

    let states = filter::state_options(&data.records, selection.region.as_deref());
    println!("States: Todas, {}", states.join(", "));
    selection = selection.with_state(&read_line("State [Todas]: "));

    if let Some((lo, hi)) = filter::date_bounds(&data.records) {
        println!("Order dates run from {} to {}.", lo, hi);
        let start = read_line(&format!("Start date [{}]: ", lo));
        let end = read_line(&format!("End date [{}]: ", hi));
        selection = selection.with_date_input(&start, &end, (lo, hi));
    }

    selection.reconcile(&data.records);
    println!("Filters updated.\n");
    state().selection = selection;
}

/// Handle options [3] and [4]: render the current view.
fn handle_render(as_json: bool) {
    let Some(data) = loaded_data() else {
        return;
    };
    let (selection, config) = {
        let app = state();
        (app.selection.clone(), app.config.clone())
    };
    let view = reports::render(&data, &selection, config.render_options());
    if as_json {
        match output::view_json(&view) {
            Ok(json) => println!("{}\n", json),
            Err(e) => eprintln!("Serialization error: {}", e),
        }
    } else {
        output::print_dashboard(&view, config.label_width, config.preview_rows);
    }
}

fn main() {
    sales_dashboard::init_logging();
    loop {
        println!("Sales Dashboard:");
        println!("[1] Load the file");
        println!("[2] Set filters");
        println!("[3] Show dashboard");
        println!("[4] Print dashboard as JSON");
        println!("[5] Reload the file");
        println!("[0] Exit\n");
        match read_choice().as_str() {
            "1" => handle_load(),
            "2" => handle_filters(),
            "3" => handle_render(false),
            "4" => handle_render(true),
            "5" => handle_reload(),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-5.\n"),
        }
    }
}
