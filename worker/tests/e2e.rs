use std::{num::NonZeroUsize, sync::Arc};

use comms::{LocalRoster, Mediator, Membership};
use coordinator::{Collaborators, Coordinator, FeedEvent, Topics, TrainConfig};
use model::{Example, NetParams, NetSpec, NetVariant, Reducible};
use ndarray::array;
use tokio::sync::mpsc;
use worker::WorkerLoop;

const EPS: f32 = 1e-6;

#[tokio::test]
async fn one_worker_drives_the_run_to_completion() {
    let net = NetSpec::new(11, 0.01, 0.9, 2, 1, None, NetVariant::Shallow).unwrap();
    let config = TrainConfig::new(net.clone(), 2, NonZeroUsize::new(1).unwrap());
    let initial = NetParams::seeded(&net).unwrap();
    let w0 = initial.weights()[0][[0, 0]];

    let mediator = Arc::new(Mediator::new(16));
    let roster = Arc::new(LocalRoster::new());
    roster.join(0);

    let (feed_tx, mut feed_rx) = mpsc::unbounded_channel();
    let (dispatch_tx, _dispatch_rx) = mpsc::unbounded_channel();

    let (coordinator, handle) = Coordinator::new(
        &config,
        Topics::new("model.broadcast", "model.control"),
        0,
        initial,
        Collaborators {
            mediator: Arc::clone(&mediator),
            membership: Arc::clone(&roster) as Arc<dyn Membership>,
            feed: feed_tx,
            dispatch: dispatch_tx,
        },
    );

    let (bulletins, ack) = mediator.subscribe("model.broadcast");
    handle.ack(ack);

    // Each round the worker halves whatever snapshot it was handed.
    let compute = |snapshot: &NetParams, _units: &[Example]| {
        let mut update = snapshot.clone();
        update.scale(0.5);
        update
    };

    let (unit_tx, unit_rx) = mpsc::unbounded_channel();
    let worker = WorkerLoop::new(1, bulletins, unit_rx, handle.clone(), compute);

    let coordinator_task = tokio::spawn(coordinator.run());
    let worker_task = tokio::spawn(worker.run());

    unit_tx
        .send(Example::new(array![1.0, 2.0], array![1.0]))
        .unwrap();

    // Epoch one completes: the feed sees a reset followed by an advance,
    // which is the cue to hand out the next round of data.
    let Some(FeedEvent::Reset) = feed_rx.recv().await else {
        panic!("expected the reset request");
    };
    let Some(FeedEvent::Advance(_)) = feed_rx.recv().await else {
        panic!("expected the advance trigger");
    };

    unit_tx
        .send(Example::new(array![3.0, 4.0], array![0.0]))
        .unwrap();

    let snapshot = coordinator_task.await.unwrap().unwrap();
    let expected = 0.25 * w0;
    let got = snapshot.weights()[0][[0, 0]];
    assert!((got - expected).abs() < EPS, "{got} != {expected}");

    // The terminal advance is still delivered to the feed.
    let Some(FeedEvent::Advance(_)) = feed_rx.recv().await else {
        panic!("expected the terminal advance trigger");
    };

    // The coordinator has marked itself down and left the roster.
    assert!(!roster.is_alive(0));
    assert!(roster.is_empty());

    // Closing the unit channel lets the worker wind down.
    drop(unit_tx);
    let stats = worker_task.await.unwrap().unwrap();
    assert_eq!(stats.contributions, 2);
    assert_eq!(stats.units, 2);
}
