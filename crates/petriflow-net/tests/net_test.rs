//! Firing properties checked over a branching net.

use std::collections::BTreeSet;
use std::sync::Arc;

use petriflow_net::{Net, Process, TokenId, Variables};

/// Nine places, seven transitions. t0 splits into two branches that join
/// again at t3 (which needs a token in both p3 and p4).
fn branching() -> Arc<Process> {
  Arc::new(
    Process::builder("branching")
      .input_matrix(vec![
        vec![1, 0, 0, 0, 0, 0, 0, 0, 0],
        vec![0, 1, 0, 0, 0, 0, 0, 0, 0],
        vec![0, 0, 1, 0, 0, 0, 0, 0, 0],
        vec![0, 0, 0, 1, 1, 0, 0, 0, 0],
        vec![0, 0, 0, 0, 0, 1, 0, 0, 0],
        vec![0, 0, 0, 0, 0, 0, 1, 0, 0],
        vec![0, 0, 0, 0, 0, 0, 0, 1, 0],
      ])
      .output_matrix(vec![
        vec![0, 1, 1, 0, 0, 0, 0, 0, 0],
        vec![0, 0, 0, 1, 0, 0, 0, 0, 0],
        vec![0, 0, 0, 0, 1, 0, 0, 0, 0],
        vec![0, 0, 0, 0, 0, 1, 0, 0, 0],
        vec![0, 0, 0, 0, 0, 0, 1, 0, 0],
        vec![0, 0, 0, 0, 0, 0, 0, 1, 0],
        vec![0, 0, 0, 0, 0, 0, 0, 0, 1],
      ])
      .initial_state(vec![3, 0, 0, 0, 0, 0, 0, 0, 0])
      .build()
      .unwrap(),
  )
}

fn all_tokens(net: &Net) -> BTreeSet<TokenId> {
  (0..net.process().places())
    .flat_map(|p| net.tokens(p).collect::<Vec<_>>())
    .collect()
}

fn adjacent(process: &Process, transition: usize, place: usize) -> bool {
  process.input_weights(transition)[place] > 0 || process.output_weights(transition)[place] > 0
}

/// Fire the first enabled transition until nothing is enabled, checking
/// every property on each step.
#[test]
fn test_every_fire_conserves_tokens_and_touches_only_neighbours() {
  let process = branching();
  let mut net = Net::new(process.clone());
  let vars = Variables::new();
  net.init(&vars);

  let mut fires = 0;
  while let Some(&t) = net.enabled().first() {
    let before_state = net.state();
    let before_tokens = all_tokens(&net);

    net.fire(t, &vars).unwrap();
    fires += 1;

    let after_state = net.state();
    let after_tokens = all_tokens(&net);

    for p in 0..process.places() {
      if !adjacent(&process, t, p) {
        assert_eq!(before_state[p], after_state[p], "place {} changed on fire of {}", p, t);
      }
    }

    let produced: i64 = process.output_weights(t).iter().map(|w| *w as i64).sum();
    let consumed: i64 = process.input_weights(t).iter().map(|w| *w as i64).sum();
    let before_sum: i64 = before_state.iter().map(|n| *n as i64).sum();
    let after_sum: i64 = after_state.iter().map(|n| *n as i64).sum();
    assert_eq!(after_sum - before_sum, produced - consumed);

    let removed: BTreeSet<_> = before_tokens.difference(&after_tokens).copied().collect();
    let added: BTreeSet<_> = after_tokens.difference(&before_tokens).copied().collect();
    assert_eq!(removed.len() as i64, consumed);
    assert_eq!(added.len() as i64, produced);
    // Fresh identities never collide with anything seen before.
    assert!(added.iter().all(|t| !before_tokens.contains(t)));

    assert!(fires < 100, "net did not settle");
  }

  assert_eq!(net.state(), vec![0, 0, 0, 0, 0, 0, 0, 0, 3]);
  assert_eq!(fires, 3 * 7);
}

#[test]
fn test_nets_from_one_process_are_independent() {
  let process = branching();
  let vars = Variables::new();

  let mut first = Net::new(process.clone());
  let mut second = Net::new(process.clone());
  first.init(&vars);
  second.init(&vars);

  first.fire(0, &vars).unwrap();

  assert_eq!(first.state()[0], 2);
  assert_eq!(second.state()[0], 3);
  assert_eq!(process.initial_state()[0], 3);
}

#[test]
fn test_join_requires_both_branches() {
  let process = branching();
  let vars = Variables::new();
  let mut net = Net::new(process);
  net.init(&vars);

  net.fire(0, &vars).unwrap();
  net.fire(1, &vars).unwrap();
  assert!(!net.is_enabled(3));

  net.fire(2, &vars).unwrap();
  assert!(net.is_enabled(3));
}
