//! memsim - Memory management policy simulator
//!
//! Usage:
//!   memsim paging  [-f FRAMES] [-p fifo|lru] [-o OUT] [-v] <INPUT>
//!   memsim segment [-m TOTAL] [-o OUT] [-v] <SCRIPT>
//!   memsim vm      [-f FRAMES] [-o OUT] [-v] <INPUT>
//!
//! INPUT is a reference string (whitespace-separated page numbers, `reset` allowed).
//! SCRIPT holds one `alloc <size> <label>`, `free <label>` or `reset` per line.

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};

use memsim::constants::*;
use memsim::io::{read_reference_string, read_segment_script, write_results};
use memsim::session::{Step, run_paging, run_segmentation, run_virtual_memory, status_lines};
use memsim::{PagingEngine, ReplacementPolicy, SegmentationEngine, VirtualMemoryEngine};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum Policy {
    Fifo,
    Lru,
}

impl From<Policy> for ReplacementPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Fifo => ReplacementPolicy::Fifo,
            Policy::Lru => ReplacementPolicy::Lru,
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        match DEFAULT_POLICY {
            ReplacementPolicy::Fifo => Policy::Fifo,
            ReplacementPolicy::Lru => Policy::Lru,
        }
    }
}

/// Simulate paging, segmentation and virtual memory policies
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Print every hit, fault and eviction
    #[clap(short, long, global = true)]
    verbose: bool,

    /// Write status lines to this file instead of stdout
    #[clap(short, long, global = true, value_parser)]
    output: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a reference string through the paging engine
    Paging {
        /// Number of physical frames
        #[clap(short, long, default_value_t = DEFAULT_PAGING_FRAMES)]
        frames: usize,

        /// Page replacement policy
        #[clap(short, long, value_enum, default_value_t = Policy::default())]
        policy: Policy,

        /// Reference string file
        input: PathBuf,
    },
    /// Run an allocation script through the segmentation engine
    Segment {
        /// Size of the address space
        #[clap(short = 'm', long, default_value_t = DEFAULT_TOTAL_MEMORY)]
        total_memory: usize,

        /// Script file
        script: PathBuf,
    },
    /// Run a reference string through the virtual memory engine
    Vm {
        /// Number of physical frames
        #[clap(short, long, default_value_t = DEFAULT_VM_FRAMES)]
        frames: usize,

        /// Reference string file
        input: PathBuf,
    },
}

fn main() {
    let args = Args::parse();
    memsim::logging::init(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Main logic separated from main() for cleaner error handling
fn run(args: &Args) -> anyhow::Result<()> {
    let (steps, summary) = match &args.command {
        Command::Paging { frames, policy, input } => {
            let ops = read_reference_string(input)
                .with_context(|| format!("loading {}", input.display()))?;
            let mut engine = PagingEngine::new(*frames, (*policy).into())?;
            log::debug!("{} references loaded", ops.len());

            let steps = run_paging(&mut engine, &ops);
            log::debug!("next victims by frame: {:?}", engine.eviction_order());
            let summary = vec![
                format!("Frames ({}): {}", engine.num_frames(), engine.frame_table()),
                format!(
                    "Policy: {}  Faults: {}  Hits: {}",
                    engine.policy(),
                    engine.fault_count(),
                    engine.hit_count()
                ),
            ];
            (steps, summary)
        }
        Command::Segment { total_memory, script } => {
            let commands = read_segment_script(script)
                .with_context(|| format!("loading {}", script.display()))?;
            let mut engine = SegmentationEngine::new(*total_memory)?;

            let steps = run_segmentation(&mut engine, &commands);
            let segments: Vec<String> = engine.segments().iter().map(|s| s.to_string()).collect();
            let summary = vec![
                format!("Segments: [{}]", segments.join(", ")),
                format!(
                    "Used: {}  Free memory: {} of {}  Largest gap: {}",
                    engine.used_memory(),
                    engine.free_memory(),
                    engine.total_memory(),
                    engine.largest_free_gap()
                ),
            ];
            (steps, summary)
        }
        Command::Vm { frames, input } => {
            let ops = read_reference_string(input)
                .with_context(|| format!("loading {}", input.display()))?;
            let mut engine = VirtualMemoryEngine::new(*frames)?;

            let steps = run_virtual_memory(&mut engine, &ops);
            log::debug!("next victims by frame: {:?}", engine.fifo_order());
            let table: Vec<String> = engine
                .page_table()
                .iter()
                .map(|(vpage, frame)| format!("{}->{}", vpage, frame))
                .collect();
            let summary = vec![
                format!("Physical Memory ({}): {}", engine.num_frames(), engine.frame_table()),
                format!("Page Table: {{{}}}", table.join(", ")),
                format!("Faults: {}  Hits: {}", engine.fault_count(), engine.hit_count()),
            ];
            (steps, summary)
        }
    };

    report(args, &steps, &summary)
}

fn report(args: &Args, steps: &[Step], summary: &[String]) -> anyhow::Result<()> {
    let lines = status_lines(steps);
    match &args.output {
        Some(path) => {
            write_results(path, &lines)
                .with_context(|| format!("writing {}", path.display()))?;
            log::info!("Results written to: {}", path.display());
        }
        None => {
            for line in &lines {
                println!("{}", line);
            }
        }
    }

    for line in summary {
        println!("{}", line);
    }
    Ok(())
}
