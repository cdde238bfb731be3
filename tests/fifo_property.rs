use proptest::prelude::*;
use tickqueue::{ManualQueue, TickOutcome};

#[derive(Debug, Clone)]
enum Op {
    Submit,
    SubmitImmediate,
    Tick,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Submit),
        1 => Just(Op::SubmitImmediate),
        2 => Just(Op::Tick),
    ]
}

proptest! {
    #[test]
    fn deferred_tasks_run_in_submission_order(ops in proptest::collection::vec(op_strategy(), 0..64)) {
        // Context records (is_immediate, sequence number) as actions run.
        let mut queue = ManualQueue::new(Vec::<(bool, usize)>::new());
        let mut deferred_submitted = 0usize;
        let mut immediate_submitted = 0usize;

        for op in ops {
            match op {
                Op::Submit => {
                    let seq = deferred_submitted;
                    queue.submit(move |log: &mut Vec<(bool, usize)>| log.push((false, seq))).unwrap();
                    deferred_submitted += 1;
                }
                Op::SubmitImmediate => {
                    let seq = immediate_submitted;
                    let before = queue.context().len();
                    queue
                        .submit_immediate(move |log: &mut Vec<(bool, usize)>| log.push((true, seq)))
                        .unwrap();
                    // Runs before returning, without draining anything else.
                    prop_assert_eq!(queue.context().len(), before + 1);
                    immediate_submitted += 1;
                }
                Op::Tick => {
                    let pending = queue.pending();
                    let outcome = queue.tick();
                    prop_assert_eq!(outcome == TickOutcome::Idle, pending == 0);
                }
            }
        }

        queue.run_until_idle();
        let log = queue.into_context();

        let deferred: Vec<usize> = log.iter().filter(|(imm, _)| !imm).map(|(_, s)| *s).collect();
        let immediate: Vec<usize> = log.iter().filter(|(imm, _)| *imm).map(|(_, s)| *s).collect();

        prop_assert_eq!(deferred, (0..deferred_submitted).collect::<Vec<_>>());
        prop_assert_eq!(immediate, (0..immediate_submitted).collect::<Vec<_>>());
    }
}
