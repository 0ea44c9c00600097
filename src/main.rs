//! Headless runner for the Treasure Boxes task.
//!
//! Examples:
//!   treasure-boxes run --seed 7 --policy greedy
//!   treasure-boxes run --policy script:ABCDAAAAAD --store none --out ./pilot
//!   treasure-boxes summarize ./pilot/curiosity_game_<id>_<ms>.json
//!   treasure-boxes paths
//!
//! `run` plays a full session with a simulated participant, driving the same
//! pointer and frame-tick path a browser front end would, then writes the
//! export file.

use std::path::PathBuf;
use std::process;

use tracing::{info, warn};
use treasure_boxes::clock::{Clock, ManualClock, SystemClock};
use treasure_boxes::export::SessionRecord;
use treasure_boxes::paths::AppPaths;
use treasure_boxes::prng::{Prng, RandomSource};
use treasure_boxes::round::{Phase, Screen};
use treasure_boxes::stats::SessionSummary;
use treasure_boxes::storage::{FileStore, NullStore, SummarySink};
use treasure_boxes::{ContainerId, Session, SessionConfig};

const FRAME_MS: u32 = 16;
const VIEWPORT: (f32, f32) = (1280.0, 800.0);

fn usage() -> ! {
    eprintln!("treasure-boxes (headless Treasure Boxes session runner)");
    eprintln!("Usage: treasure-boxes <command> [args]\n");
    eprintln!("Commands:");
    eprintln!("  run [options]               Play one simulated session and export it");
    eprintln!("      --seed <n>              Seed for payouts and the participant");
    eprintln!("      --policy <p>            greedy | random | explorer | script:<ABCD...>");
    eprintln!("      --think-ms <n>          Simulated decision time per round (default 800)");
    eprintln!("      --config <file>         Session config JSON (default: data dir/config.json if present)");
    eprintln!("      --out <dir>             Export directory (default: data dir/exports)");
    eprintln!("      --store <dir|none>      Per-click snapshot directory (default: data dir/sessions)");
    eprintln!("  summarize <export.json>     Recompute metrics from an export's events");
    eprintln!("  paths                       Show data directories");
    process::exit(1);
}

fn fail(msg: &str) -> ! {
    eprintln!("{}", msg);
    process::exit(1);
}

// ─────────────────────────────────────────────────────────────────────────
// Simulated participants
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Policy {
    /// Sample every box while learning, then stick with the best mean.
    Greedy,
    Random,
    /// Like `Random`, but half of all testing picks go to the mystery box.
    Explorer,
    Script(Vec<ContainerId>),
}

impl Policy {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "greedy" => Some(Policy::Greedy),
            "random" => Some(Policy::Random),
            "explorer" => Some(Policy::Explorer),
            _ => {
                let letters = s.strip_prefix("script:")?;
                let picks: Option<Vec<_>> = letters
                    .chars()
                    .map(|c| ContainerId::parse(&c.to_string()))
                    .collect();
                picks.filter(|p| !p.is_empty()).map(Policy::Script)
            }
        }
    }
}

struct Participant {
    policy: Policy,
    rng: Prng,
    reward_sums: [u32; 4],
    opens: [u32; 4],
}

impl Participant {
    fn new(policy: Policy, seed: u64) -> Self {
        Self {
            policy,
            rng: Prng::new(seed),
            reward_sums: [0; 4],
            opens: [0; 4],
        }
    }

    fn random_pick(&mut self) -> ContainerId {
        ContainerId::ALL[self.rng.gen_range_u32(0, 4) as usize]
    }

    fn choose(&mut self, round_index: u32, phase: Phase) -> ContainerId {
        match &self.policy {
            Policy::Script(picks) => picks[round_index as usize % picks.len()],
            Policy::Random => self.random_pick(),
            Policy::Explorer => {
                if phase == Phase::Testing && self.rng.gen_range_u32(0, 2) == 0 {
                    ContainerId::MYSTERY
                } else {
                    self.random_pick()
                }
            }
            Policy::Greedy => match phase {
                Phase::Learning => ContainerId::ALL[round_index as usize % 4],
                Phase::Testing => self.best_so_far(),
            },
        }
    }

    fn best_so_far(&self) -> ContainerId {
        let mean = |i: usize| {
            if self.opens[i] == 0 {
                0.0
            } else {
                self.reward_sums[i] as f64 / self.opens[i] as f64
            }
        };
        ContainerId::ALL
            .iter()
            .copied()
            .max_by(|a, b| mean(a.index()).total_cmp(&mean(b.index())))
            .unwrap_or(ContainerId::OPTIMAL)
    }

    fn observe(&mut self, id: ContainerId, reward: u32) {
        self.reward_sums[id.index()] += reward;
        self.opens[id.index()] += 1;
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────

struct RunArgs {
    seed: u64,
    policy: Policy,
    think_ms: u32,
    config: Option<PathBuf>,
    out: Option<PathBuf>,
    store: Option<String>,
}

fn parse_run_args(args: &[String]) -> RunArgs {
    let mut out = RunArgs {
        seed: Prng::from_entropy().next_u32() as u64,
        policy: Policy::Greedy,
        think_ms: 800,
        config: None,
        out: None,
        store: None,
    };

    let mut it = args.iter();
    while let Some(flag) = it.next() {
        let value = it.next().unwrap_or_else(|| usage());
        match flag.as_str() {
            "--seed" => {
                out.seed = value
                    .parse()
                    .unwrap_or_else(|_| fail("seed must be a non-negative integer"))
            }
            "--policy" => {
                out.policy = Policy::parse(value)
                    .unwrap_or_else(|| fail("policy must be greedy|random|explorer|script:<ABCD...>"))
            }
            "--think-ms" => {
                out.think_ms = value
                    .parse()
                    .unwrap_or_else(|_| fail("think-ms must be a number"))
            }
            "--config" => out.config = Some(PathBuf::from(value)),
            "--out" => out.out = Some(PathBuf::from(value)),
            "--store" => out.store = Some(value.clone()),
            _ => usage(),
        }
    }
    out
}

/// Advance both the session's frame timers and its wall clock.
fn run_frames(session: &mut Session, clock: &ManualClock, total_ms: u32) {
    let mut left = total_ms;
    while left > 0 {
        let dt = left.min(FRAME_MS);
        clock.advance(dt as u64);
        session.tick(dt);
        left -= dt;
    }
}

fn run(args: RunArgs) -> treasure_boxes::Result<()> {
    let paths = AppPaths::new();

    let config = match (&args.config, &paths) {
        (Some(p), _) => SessionConfig::load(p)?,
        (None, Ok(p)) => SessionConfig::load_or_default(&p.config_file())?,
        (None, Err(_)) => SessionConfig::default(),
    };

    let sink: Box<dyn SummarySink> = match args.store.as_deref() {
        Some("none") => Box::new(NullStore),
        Some(dir) => Box::new(FileStore::new(dir)),
        None => match &paths {
            Ok(p) => Box::new(FileStore::new(p.sessions_dir())),
            Err(e) => {
                warn!("No data directory ({}); per-click snapshots disabled", e);
                Box::new(NullStore)
            }
        },
    };

    let out_dir = match (&args.out, &paths) {
        (Some(dir), _) => dir.clone(),
        (None, Ok(p)) => p.exports_dir(),
        (None, Err(_)) => PathBuf::from("."),
    };

    let clock = ManualClock::new(SystemClock.now_ms());
    let mut session = Session::builder(config)
        .seed(args.seed)
        .clock(clock.clone())
        .sink(sink)
        .viewport(VIEWPORT.0, VIEWPORT.1)
        .build();
    let mut participant = Participant::new(args.policy, args.seed.wrapping_add(1));

    info!(session = %session.session_id(), seed = args.seed, "running simulated participant");

    // Any press dismisses the intro.
    run_frames(&mut session, &clock, 1_000);
    session.handle_pointer(0.0, 0.0);

    while session.screen() == Screen::Playing {
        run_frames(&mut session, &clock, args.think_ms);

        let round = session.round();
        let pick = participant.choose(round.round_index(), round.phase());
        let Some(rect) = session.layout().map(|l| l.rect(pick)) else {
            break;
        };
        let Some(event) = session.handle_pointer(rect.x + rect.w / 2.0, rect.y + rect.h / 2.0)
        else {
            break;
        };
        participant.observe(event.container_id, event.reward_amount);

        while session.screen() == Screen::Reward {
            run_frames(&mut session, &clock, FRAME_MS);
        }
    }

    let record = session.record();
    print_summary(&record.session_id, record.total_events, &record.metrics);
    println!("total reward: {}", session.round().total_reward());

    let path = record.write_to_dir(&out_dir, clock.now_ms())?;
    println!("exported: {}", path.display());
    Ok(())
}

fn summarize_file(path: &str) -> treasure_boxes::Result<()> {
    let record = SessionRecord::load(&PathBuf::from(path))?;
    let metrics = record.resummarize();
    if metrics != record.metrics {
        warn!("Stored metrics differ from the recomputed ones; showing recomputed");
    }
    print_summary(&record.session_id, record.events.len(), &metrics);
    Ok(())
}

fn print_summary(session_id: &str, events: usize, m: &SessionSummary) {
    println!("session={} events={}", session_id, events);
    println!(
        "exploitation={:.1}% breadth={:.1}% mystery={:.1}% discovered_optimal={} avg_gap={:.0}ms",
        m.exploitation_rate * 100.0,
        m.exploration_breadth * 100.0,
        m.mystery_preference * 100.0,
        m.discovered_optimal,
        m.avg_inter_arrival_ms,
    );
    println!(
        "learning A={} B={} C={} D={} | testing A={} B={} C={} D={}",
        m.learning_counts.a,
        m.learning_counts.b,
        m.learning_counts.c,
        m.learning_counts.d,
        m.test_counts.a,
        m.test_counts.b,
        m.test_counts.c,
        m.test_counts.d,
    );
}

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        usage();
    }

    let result = match args[0].as_str() {
        "run" => run(parse_run_args(&args[1..])),
        "summarize" => {
            if args.len() < 2 {
                usage();
            }
            summarize_file(&args[1])
        }
        "paths" => match AppPaths::new() {
            Ok(p) => {
                println!("Data directory: {}", p.data_dir().display());
                println!("Session snapshots: {}", p.sessions_dir().display());
                println!("Exports: {}", p.exports_dir().display());
                println!("Config: {}", p.config_file().display());
                Ok(())
            }
            Err(e) => Err(e),
        },
        _ => usage(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
