use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use procscope_core::config::{InspectorConfig, DEFAULT_MAX_REGIONS, DEFAULT_PROC_ROOT};
use procscope_core::format::{format_hexdump, DEFAULT_HEXDUMP_WIDTH};
use procscope_core::inspector::create_inspector;
use procscope_core::types::{Address, MemoryRegion, PageStatus, ProcessId, ProcessInfo, ThreadInfo};
use procscope_core::Inspector;
use procscope_utils::{info, init_logging_with, LogFormat, LogLevel, LoggingConfig};

/// Inspect live Linux processes: threads, memory regions, shared objects,
/// resident pages, and raw memory.
#[derive(Parser, Debug)]
#[command(name = "procscope")]
#[command(version)]
#[command(about = "Inspect live Linux processes through procfs", long_about = None)]
struct Cli
{
    /// Log level (error, warn, info, debug, trace); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format (pretty or json); overrides PROCSCOPE_LOG_FORMAT
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Root of the procfs mount
    #[arg(long, global = true, default_value = DEFAULT_PROC_ROOT)]
    proc_root: PathBuf,

    /// Refuse region lists longer than this
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_REGIONS)]
    max_regions: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// List running processes
    Processes,
    /// List the threads of a process
    Threads
    {
        /// Process ID
        pid: u32,
    },
    /// List the memory regions of a process
    Regions
    {
        /// Process ID
        pid: u32,
    },
    /// List the shared libraries mapped by a process
    Libraries
    {
        /// Process ID
        pid: u32,
    },
    /// Show the physical frames behind resident executable pages
    Pages
    {
        /// Process ID
        pid: u32,
        /// Stop after this many pages
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Hex dump memory of a process, one page-sized chunk at a time
    Read
    {
        /// Process ID
        pid: u32,
        /// Start address (hex, with or without 0x)
        address: Address,
        /// Number of consecutive chunks to read
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        chunks: u32,
        /// Bytes per hex dump line (8-32)
        #[arg(short, long, default_value_t = DEFAULT_HEXDUMP_WIDTH)]
        width: usize,
    },
}

fn main()
{
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if let Some(level) = cli.log_level {
        logging = logging.with_level(level);
    }
    if let Some(format) = cli.log_format {
        logging = logging.with_format(format);
    }
    // Held until exit so buffered file output gets flushed
    let _log_guard = match init_logging_with(logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_command(cli: Cli) -> Result<(), Box<dyn std::error::Error>>
{
    let config = InspectorConfig::new()
        .with_proc_root(cli.proc_root)
        .with_max_regions(cli.max_regions);
    let inspector = create_inspector(config)?;

    match cli.command {
        Commands::Processes => {
            print_processes(&inspector.processes()?);
        }
        Commands::Threads { pid } => {
            print_threads(&inspector.threads(ProcessId::from(pid))?);
        }
        Commands::Regions { pid } => {
            print_regions(&inspector.memory_regions(ProcessId::from(pid))?);
        }
        Commands::Libraries { pid } => {
            let regions = inspector.memory_regions(ProcessId::from(pid))?;
            for library in inspector.shared_libraries(&regions) {
                println!("{}", library);
            }
        }
        Commands::Pages { pid, limit } => {
            let pid = ProcessId::from(pid);
            let regions = inspector.memory_regions(pid)?;
            info!("Resolving executable pages of process {}", pid);
            print_pages(inspector.executable_pages(pid, &regions)?, limit);
        }
        Commands::Read {
            pid,
            address,
            chunks,
            width,
        } => {
            read_memory(&*inspector, ProcessId::from(pid), address, chunks, width)?;
        }
    }

    Ok(())
}

/// Walk forward from `address`, dumping up to `chunks` chunks
///
/// Stops early at the first unmapped address.
fn read_memory(
    inspector: &dyn Inspector,
    pid: ProcessId,
    address: Address,
    chunks: u32,
    width: usize,
) -> Result<(), Box<dyn std::error::Error>>
{
    let mut cursor = Some(address);

    for _ in 0..chunks {
        let Some(current) = cursor else {
            break;
        };

        let chunk = inspector.read_chunk(pid, current)?;
        if chunk.is_access_fault() {
            println!("Reached end of accessible address space at {}", current);
            break;
        }

        print!("{}", format_hexdump(chunk.base_address, &chunk.bytes, width));
        cursor = chunk.next_address();
    }

    Ok(())
}

fn print_processes(processes: &[ProcessInfo])
{
    println!("{:>8}  {:<16}  CMDLINE", "PID", "NAME");
    for p in processes {
        println!("{:>8}  {:<16}  {}", p.pid, p.name, p.cmdline);
    }
    println!("\n{} processes", processes.len());
}

fn print_threads(threads: &[ThreadInfo])
{
    println!("{:>8}  {:>8}  NAME", "TID", "TGID");
    for t in threads {
        println!("{:>8}  {:>8}  {}", t.tid, t.tgid, t.name);
    }
}

fn print_regions(regions: &[MemoryRegion])
{
    println!("{:<33}  PERM  SIZE        PATH", "RANGE");
    for r in regions {
        println!(
            "{:016x}-{:016x}  {}  {:<10}  {}",
            r.start,
            r.end,
            r.permissions,
            r.size(),
            r.backing_path
        );
    }
    println!("\n{} regions", regions.len());
}

fn print_pages(pages: impl Iterator<Item = PageStatus>, limit: Option<usize>)
{
    println!("{:<18}  {:<14}  {:<12}  PATH", "VIRT. ADDRESS", "PAGEFRAME NO.", "EXCL. MAPPED");

    let mut shown = 0usize;
    for page in pages.take(limit.unwrap_or(usize::MAX)) {
        println!(
            "{:<18X}  {:<14}  {:<12}  {}",
            page.virtual_address,
            page.frame_number,
            u8::from(page.exclusively_mapped),
            page.source_path
        );
        shown += 1;
    }
    println!("\n{} resident pages", shown);
}
