use anyhow::{anyhow, bail, Context, Result};
use memory_editor::config::{load_config, Config};
use memory_editor::{
    Address, MemoryReader, MemoryScanner, MemoryValue, ProcessHandle, ScanOptions, ScanPredicate,
    ValueType,
};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: memory-editor <pid> <bool|int|float|text> <length> <value> [<upper>]";

/// One search request from the command line
struct Request {
    pid: u32,
    kind: ValueType,
    length: usize,
    predicate: ScanPredicate,
}

fn parse_value(kind: ValueType, raw: &str) -> Result<MemoryValue> {
    let value = match kind {
        ValueType::Bool => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" => MemoryValue::Bool(true),
            "false" | "0" => MemoryValue::Bool(false),
            _ => bail!("'{}' is not a boolean", raw),
        },
        ValueType::Int => MemoryValue::Int(
            raw.parse()
                .with_context(|| format!("'{}' is not an integer", raw))?,
        ),
        ValueType::Float => MemoryValue::Float(
            raw.parse()
                .with_context(|| format!("'{}' is not a number", raw))?,
        ),
        ValueType::Text => MemoryValue::Text(raw.to_string()),
    };
    Ok(value)
}

fn parse_args(args: &[String]) -> Result<Request> {
    if args.len() != 4 && args.len() != 5 {
        bail!(USAGE);
    }

    let pid = args[0]
        .parse()
        .with_context(|| format!("'{}' is not a process id", args[0]))?;
    let kind: ValueType = args[1]
        .parse()
        .map_err(|err| anyhow!("{}\n{}", err, USAGE))?;
    let length = args[2]
        .parse()
        .with_context(|| format!("'{}' is not a byte length", args[2]))?;

    let value = parse_value(kind, &args[3])?;
    let predicate = match args.get(4) {
        Some(upper) => ScanPredicate::between(value, parse_value(kind, upper)?)?,
        None => ScanPredicate::exact(value),
    };

    Ok(Request {
        pid,
        kind,
        length,
        predicate,
    })
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let config = load_config().context("failed to load configuration")?;
    init_logging(&config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let request = parse_args(&args)?;
    info!("Starting Memory-Editor v{}", env!("CARGO_PKG_VERSION"));

    let mut handle = ProcessHandle::open_for_read(request.pid)
        .with_context(|| format!("failed to open process {}", request.pid))?;
    let scanner = MemoryScanner::with_options(&handle, ScanOptions::from(&config.scanner));

    let addresses: Vec<Address> = if config.scanner.parallel {
        scanner.collect_parallel(request.kind, request.length, &request.predicate)?
    } else {
        let mut search = scanner.search(request.kind, request.length, &request.predicate)?;
        let addresses: Vec<Address> = search.by_ref().collect();
        if let Some(err) = search.error() {
            bail!("scan stopped early: {}", err);
        }
        debug!(progress = ?search.progress(), "Sequential scan complete");
        addresses
    };

    let reader = MemoryReader::new(&handle);
    for address in &addresses {
        let value = reader.read(*address, request.kind, request.length).ok();
        println!(
            "{}",
            json!({ "address": address.to_string(), "value": value })
        );
    }

    println!(
        "{}",
        json!({
            "pid": request.pid,
            "type": request.kind,
            "length": request.length,
            "matches": addresses.len(),
        })
    );

    handle.close()?;
    Ok(())
}
