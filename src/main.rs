// src/main.rs
//
// Research-harness CLI entrypoint for viewlink.
//
// Binds the control listener, waits for the simulator peer, and drives a
// deterministic random policy for a fixed number of steps. Useful for
// protocol smoke testing and for generating observation logs without a
// learning stack attached.
//
// Listen-address precedence: --addr overrides VIEWLINK_LISTEN_ADDR;
// if both are missing, the built-in default (127.0.0.1:8888) is used.

use anyhow::Context;
use clap::{ArgAction, Parser};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use viewlink::config::{resolve_listen_addr, Config};
use viewlink::{ControlEnv, CsvSink, ReconnectPolicy, SessionError, ACTIONS};

#[derive(Debug, Parser)]
#[command(
    name = "viewlink",
    about = "RL control channel for an external view simulator (research harness)",
    version
)]
struct Args {
    /// Listen address (host:port). Overrides VIEWLINK_LISTEN_ADDR.
    #[arg(long)]
    addr: Option<String>,

    /// Number of control steps to run.
    #[arg(long, default_value_t = 1000)]
    steps: u64,

    /// Deterministic seed for the random policy.
    #[arg(long)]
    seed: Option<u64>,

    /// MI reward scale factor.
    #[arg(long, default_value_t = 20.0)]
    mi_scale: f64,

    /// Read/accept deadline in milliseconds (0 blocks forever).
    #[arg(long, default_value_t = 30_000)]
    timeout_ms: u64,

    /// Append decoded observations to this CSV file.
    #[arg(long)]
    log: Option<String>,

    /// Drop and re-accept the peer connection on every step
    /// (the legacy wire behaviour).
    #[arg(long)]
    reconnect_per_step: bool,

    /// Verbosity: -v prints per-step lines, -vv adds session detail.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn fnv1a64(s: &str) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;
    let mut h = FNV_OFFSET;
    for b in s.as_bytes() {
        h ^= *b as u64;
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

fn build_config(args: &Args) -> Config {
    let mut cfg = Config::default();
    cfg.transport.listen_addr = resolve_listen_addr(args.addr.as_deref());
    let timeout = if args.timeout_ms == 0 {
        None
    } else {
        Some(args.timeout_ms)
    };
    cfg.transport.accept_timeout_ms = timeout;
    cfg.transport.read_timeout_ms = timeout;
    cfg.transport.reconnect = if args.reconnect_per_step {
        ReconnectPolicy::PerStep
    } else {
        ReconnectPolicy::Persistent
    };
    cfg.reward.mi_scale = args.mi_scale;
    cfg
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cfg = build_config(&args);
    cfg.validate().context("invalid configuration")?;

    let cfg_hash = fnv1a64(&format!("{:?}", cfg));
    println!(
        "viewlink: addr={} steps={} seed={} mi_scale={} reconnect={:?} cfg_hash={:016x}",
        cfg.transport.listen_addr,
        args.steps,
        args.seed.map_or_else(|| "none".to_string(), |s| s.to_string()),
        cfg.reward.mi_scale,
        cfg.transport.reconnect,
        cfg_hash,
    );

    let mut env = ControlEnv::bind(cfg).context("failed to start control session")?;
    if let Some(path) = &args.log {
        let sink = CsvSink::append(path)
            .with_context(|| format!("failed to open observation log '{}'", path))?;
        env = env.with_sink(Box::new(sink));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed.unwrap_or(0));
    let mut total_reward = 0.0_f64;
    let mut completed = 0u64;

    for step in 0..args.steps {
        let action = ACTIONS[rng.gen_range(0..ACTIONS.len())];
        match env.step(action) {
            Ok(result) => {
                completed += 1;
                total_reward += result.reward;
                if args.verbose > 0 {
                    println!(
                        "step {:>6} action={:<10} reward={:>8.3} yaw={:.2} pitch={:.2} zoom={:.3} mi={:.4}",
                        step,
                        action.as_str(),
                        result.reward,
                        result.observation.yaw,
                        result.observation.pitch,
                        result.observation.zoom,
                        result.observation.mi,
                    );
                }
            }
            Err(e @ (SessionError::PeerClosed | SessionError::Timeout)) => {
                // Recoverable: the session already dropped the peer and the
                // next step re-accepts. The harness keeps going.
                eprintln!("step {}: {} (re-accepting)", step, e);
                if args.verbose > 1 {
                    eprintln!("session state: {:?}", env.session().state());
                }
            }
            Err(e) => return Err(e).context(format!("control step {} failed", step)),
        }
    }

    let summary = serde_json::json!({
        "steps_requested": args.steps,
        "steps_completed": completed,
        "total_reward": total_reward,
        "final_mi": env.episode().mi,
        "final_pose": env.actuator(),
    });
    println!("{}", summary);
    Ok(())
}
