use std::{
    env, fs,
    io::{self, BufWriter, Write},
    num::NonZeroUsize,
    path::PathBuf,
    process,
    sync::Arc,
};

use comms::{LocalRoster, Mediator, Membership, NodeId};
use coordinator::{
    Collaborators, Coordinator, CoordinatorHandle, ExampleBatch, FeedEvent, Topics, TrainConfig,
};
use log::{debug, error, info};
use model::{Example, ExamplePair, NetParams, NetSpec, NetVariant, Reducible};
use ndarray::Array2;
use tokio::sync::mpsc;
use worker::WorkerLoop;

const COORDINATOR_NODE: NodeId = 0;
const BROADCAST_TOPIC: &str = "model.broadcast";
const CONTROL_TOPIC: &str = "model.control";
const MEDIATOR_CAPACITY: usize = 64;

const SEED: u64 = 42;
const L2: f32 = 0.001;
const MOMENTUM: f32 = 0.9;
const N_IN: usize = 4;
const N_OUT: usize = 2;
const HIDDEN: [usize; 1] = [8];

struct Args {
    partition: NonZeroUsize,
    epochs: usize,
    out: PathBuf,
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <partition> <epochs> [snapshot_path]", args[0]);
        process::exit(1);
    }

    let partition = args[1]
        .parse::<usize>()
        .ok()
        .and_then(NonZeroUsize::new)
        .unwrap_or_else(|| {
            eprintln!("partition must be a positive integer, got {:?}", args[1]);
            process::exit(1);
        });

    let epochs = args[2].parse::<usize>().unwrap_or_else(|_| {
        eprintln!("epochs must be an integer, got {:?}", args[2]);
        process::exit(1);
    });

    let out = args
        .get(3)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("snapshot.bin"));

    Args {
        partition,
        epochs,
        out,
    }
}

/// Deterministic demo dataset; real data loading lives outside this binary.
/// Two rows per partition slot so round-robin reaches every worker.
fn demo_batch(rows: usize) -> ExampleBatch {
    let inputs = Array2::from_shape_fn((rows, N_IN), |(i, j)| (i + j) as f32 / 10.0);
    let labels = Array2::from_shape_fn((rows, N_OUT), |(i, j)| ((i + j) % 2) as f32);

    // The shapes above always match on rows.
    match ExamplePair::new(inputs, labels) {
        Ok(pair) => ExampleBatch::Pair(pair),
        Err(e) => unreachable!("demo dataset is malformed: {e}"),
    }
}

/// Replays the dataset into the coordinator on every reset request.
async fn run_feed(
    handle: CoordinatorHandle<NetParams>,
    mut feed_rx: mpsc::UnboundedReceiver<FeedEvent<NetParams>>,
    rows: usize,
) {
    handle.examples(demo_batch(rows));

    while let Some(event) = feed_rx.recv().await {
        match event {
            FeedEvent::Reset => {
                debug!("reset requested, replaying dataset");
                handle.examples(demo_batch(rows));
            }
            FeedEvent::Advance(_) => {
                debug!("epoch boundary acknowledged");
            }
        }
    }
}

/// Assigns dispatched unit rows to workers round-robin.
async fn run_dispatcher(
    mut dispatch_rx: mpsc::UnboundedReceiver<Example>,
    unit_txs: Vec<mpsc::UnboundedSender<Example>>,
) {
    let mut next = 0;

    while let Some(unit) = dispatch_rx.recv().await {
        if unit_txs[next % unit_txs.len()].send(unit).is_err() {
            debug!("worker gone, dispatcher stopping");
            break;
        }
        next += 1;
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();
    let args = parse_args();

    let net = match NetSpec::new(
        SEED,
        L2,
        MOMENTUM,
        N_IN,
        N_OUT,
        Some(HIDDEN.to_vec()),
        NetVariant::Deep,
    ) {
        Ok(net) => net,
        Err(e) => {
            error!("invalid network spec: {e}");
            process::exit(1);
        }
    };
    let config = TrainConfig::new(net, args.epochs, args.partition);

    let initial = match NetParams::seeded(config.net()) {
        Ok(params) => params,
        Err(e) => {
            error!("failed to build the initial snapshot: {e}");
            process::exit(1);
        }
    };
    info!(
        params = initial.param_count(),
        partition = args.partition.get(),
        epochs = args.epochs;
        "node starting"
    );

    let mediator = Arc::new(Mediator::new(MEDIATOR_CAPACITY));
    let roster = Arc::new(LocalRoster::new());
    roster.join(COORDINATOR_NODE);

    let (feed_tx, feed_rx) = mpsc::unbounded_channel();
    let (dispatch_tx, dispatch_rx) = mpsc::unbounded_channel();

    let (coordinator, handle) = Coordinator::new(
        &config,
        Topics::new(BROADCAST_TOPIC, CONTROL_TOPIC),
        COORDINATOR_NODE,
        initial,
        Collaborators {
            mediator: Arc::clone(&mediator),
            membership: Arc::clone(&roster) as Arc<dyn Membership>,
            feed: feed_tx,
            dispatch: dispatch_tx,
        },
    );

    // Co-located workers, one per partition slot. The compute stands in for
    // a real trainer: it nudges the received snapshot by a per-worker factor.
    let mut unit_txs = Vec::with_capacity(args.partition.get());
    for id in 1..=args.partition.get() {
        let (bulletins, ack) = mediator.subscribe(BROADCAST_TOPIC);
        handle.ack(ack);
        roster.join(id);

        let (unit_tx, unit_rx) = mpsc::unbounded_channel();
        unit_txs.push(unit_tx);

        let factor = 1.0 - 0.01 * id as f32;
        let compute = move |snapshot: &NetParams, units: &[Example]| {
            debug!(worker_id = id, units = units.len(); "computing partial update");
            let mut update = snapshot.clone();
            update.scale(factor);
            update
        };

        let loop_ = WorkerLoop::new(id, bulletins, unit_rx, handle.clone(), compute);
        tokio::spawn(loop_.run());
    }

    tokio::spawn(run_feed(handle.clone(), feed_rx, args.partition.get() * 2));
    tokio::spawn(run_dispatcher(dispatch_rx, unit_txs));

    let snapshot = coordinator.run().await?;

    let file = fs::File::create(&args.out)?;
    let mut sink = BufWriter::new(file);
    snapshot.write_to(&mut sink)?;
    sink.flush()?;
    info!(path = args.out.display().to_string().as_str(); "final snapshot written");

    Ok(())
}
