//! dash-runner: headless runner for the Customer 360 dashboard core.
//!
//! Usage:
//!   dash-runner --data customers.csv --segments Premium,Mass
//!   dash-runner --data customers.csv --customer 1042 --export out.csv
//!   dash-runner --config dash.json --ipc-mode

use anyhow::Result;
use customer360_core::{
    config::DashboardConfig,
    dataset::Dataset,
    session::{Customer360View, DashboardSession},
    types::Product,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    SetFilter { segments: Vec<String> },
    Lookup { customer_id: u64 },
    ExportCsv { path: Option<String> },
    Quit,
}

#[derive(serde::Serialize)]
struct LookupResponse {
    found: bool,
    customer: Option<Customer360View>,
}

#[derive(serde::Serialize)]
struct ExportResponse {
    path: String,
    bytes: usize,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");

    let mut config = match arg_value(&args, "--config") {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(data) = arg_value(&args, "--data") {
        config.data_file = data.to_string();
    }

    if !ipc_mode {
        println!("Customer 360 — dash-runner");
        println!("  data_file: {}", config.data_file);
        println!();
    }

    let dataset = Dataset::load(&config.data_file, &config.unknown_label)?;
    let mut session = DashboardSession::new(dataset, &config);

    if let Some(spec) = arg_value(&args, "--segments") {
        session.set_filter(spec.split(',').map(|s| s.trim().to_string()));
    }

    if ipc_mode {
        return run_ipc_loop(&mut session);
    }

    print_summary(&session);

    if let Some(raw) = arg_value(&args, "--customer") {
        let customer_id: u64 = raw
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid customer id: {raw}"))?;
        print_customer(&session, customer_id);
    }

    if args.iter().any(|a| a == "--export") {
        let path = arg_value(&args, "--export")
            .filter(|v| !v.starts_with("--"))
            .map(str::to_string)
            .unwrap_or_else(default_export_name);
        let bytes = session.export_filtered_csv()?;
        std::fs::write(&path, &bytes).map_err(|e| anyhow::anyhow!("Cannot write {path}: {e}"))?;
        println!();
        println!("Exported {} bytes to {path}", bytes.len());
    }

    Ok(())
}

fn run_ipc_loop(session: &mut DashboardSession) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {
                writeln!(stdout, "{}", serde_json::to_string(&session.view())?)?;
            }
            IpcCommand::SetFilter { segments } => {
                session.set_filter(segments);
                writeln!(stdout, "{}", serde_json::to_string(&session.view())?)?;
            }
            IpcCommand::Lookup { customer_id } => {
                let customer = session.lookup(customer_id);
                let response = LookupResponse {
                    found: customer.is_some(),
                    customer,
                };
                writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
            }
            IpcCommand::ExportCsv { path } => {
                let path = path.unwrap_or_else(default_export_name);
                let bytes = session.export_filtered_csv()?;
                std::fs::write(&path, &bytes)
                    .map_err(|e| anyhow::anyhow!("Cannot write {path}: {e}"))?;
                let response = ExportResponse {
                    path,
                    bytes: bytes.len(),
                };
                writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn print_summary(session: &DashboardSession) {
    let view = session.view();

    println!("=== CUSTOMER 360 SUMMARY ===");
    println!("  table size:     {}", session.dataset().len());
    println!("  selection:      {}", view.selected_segments.join(", "));
    match &view.kpis {
        Some(kpis) => {
            println!("  customers:      {}", kpis.customers);
            println!("  avg income:     {}", kpis.avg_income);
            println!("  avg balance:    {}", kpis.avg_balance);
            println!("  avg products:   {:.2}", kpis.avg_product_count);
        }
        None => println!("  customers:      0 (no data for selection)"),
    }

    println!();
    println!("=== SEGMENT DISTRIBUTION ===");
    if view.segment_distribution.is_empty() {
        println!("  (empty selection)");
    }
    for entry in &view.segment_distribution {
        println!("  {:<24} {}", entry.segment, entry.customers);
    }

    println!();
    println!("=== PRODUCT PENETRATION ===");
    for seg in &view.product_penetration {
        let cells: Vec<String> = Product::ALL
            .iter()
            .map(|&p| format!("{}: {:.1}%", p.label(), seg.pct(p)))
            .collect();
        println!("  {:<24} {}", seg.segment, cells.join(" | "));
    }

    println!();
    println!("=== CROSS-SELL OFFER MIX ===");
    for offer in &view.offer_mix {
        println!("  {:<32} {}", offer.offer, offer.customers);
    }
}

fn print_customer(session: &DashboardSession, customer_id: u64) {
    println!();
    println!("=== CUSTOMER 360 LOOKUP ===");
    match session.lookup(customer_id) {
        Some(view) => {
            let p = &view.profile;
            println!("  customer_id:    {}", p.customer_id);
            println!("  age:            {}", p.age);
            println!("  segment:        {}", p.segment_name);
            println!("  income:         {:.0}", p.income);
            println!("  avg balance:    {:.0}", p.avg_balance);
            println!("  products held:  {}", p.product_count);
            println!("  risk score:     {:.2}", p.risk_score);
            println!(
                "  holdings:       credit_card={} loan={} investments={}",
                view.holdings.has_credit_card,
                view.holdings.has_loan,
                view.holdings.has_investments
            );
            println!("  offer:          {}", view.recommended_offer);
        }
        None => println!("  Customer {customer_id} not found."),
    }
}

fn default_export_name() -> String {
    format!(
        "customer_360_segmented_{}.csv",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    )
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
