//! Linear settling pass merging the drained operation stream into the
//! backing array.

use std::collections::VecDeque;

use op_tree::DrainOp;

/// Applies an in-order operation stream (terminated by
/// [`DrainOp::End`]) to `array` in a single pass.
///
/// The FIFO buffers committed elements the write cursor has run past;
/// the stream of still-unconsumed elements is always the FIFO followed
/// by `array[read..]`. Writes overwrite in place and only push at the
/// tail, so the pass reuses existing capacity.
pub fn apply_ops<T, I>(array: &mut Vec<T>, ops: I)
where
    T: Clone,
    I: Iterator<Item = DrainOp<T>>,
{
    let committed = array.len();
    let mut fifo: VecDeque<T> = VecDeque::new();
    let mut write = 0usize;
    let mut read = 0usize;
    let mut pending: Option<T> = None;
    for op in ops {
        let key = op.key() as usize;
        while write < key {
            if read < committed {
                fifo.push_back(array[read].clone());
                read += 1;
            }
            let value = match pending.take() {
                Some(value) => {
                    fifo.pop_front();
                    value
                }
                None => fifo
                    .pop_front()
                    .expect("operation stream ran ahead of the available elements"),
            };
            put(array, write, value);
            write += 1;
        }
        match op {
            DrainOp::Insert { value, .. } => {
                if read < committed {
                    fifo.push_back(array[read].clone());
                    read += 1;
                }
                put(array, write, value);
                write += 1;
            }
            DrainOp::Set { value, .. } => pending = Some(value),
            DrainOp::Remove { count, .. } => {
                for _ in 0..count {
                    if fifo.pop_front().is_none() {
                        read += 1;
                    }
                }
            }
            DrainOp::End { .. } => array.truncate(write),
        }
    }
}

fn put<T>(array: &mut Vec<T>, index: usize, value: T) {
    if index < array.len() {
        array[index] = value;
    } else {
        array.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_insert_shifts_the_tail() {
        let mut array = vec![10, 20, 30];
        apply_ops(
            &mut array,
            vec![
                DrainOp::Insert { key: 1, value: 99 },
                DrainOp::End { key: 4 },
            ]
            .into_iter(),
        );
        assert_eq!(array, vec![10, 99, 20, 30]);
    }

    #[test]
    fn test_remove_with_empty_fifo_skips_committed_elements() {
        let mut array = vec![10, 20, 30];
        apply_ops(
            &mut array,
            vec![
                DrainOp::Remove { key: 1, count: 1 },
                DrainOp::End { key: 2 },
            ]
            .into_iter(),
        );
        assert_eq!(array, vec![10, 30]);
    }

    #[test]
    fn test_remove_drains_displaced_elements_first() {
        let mut array = vec![10, 20, 30];
        apply_ops(
            &mut array,
            vec![
                DrainOp::Insert { key: 0, value: 1 },
                DrainOp::Remove { key: 2, count: 1 },
                DrainOp::End { key: 3 },
            ]
            .into_iter(),
        );
        assert_eq!(array, vec![1, 10, 30]);
    }

    #[test]
    fn test_pending_set_lands_on_the_next_caught_up_slot() {
        let mut array = vec![10, 20, 30];
        apply_ops(
            &mut array,
            vec![
                DrainOp::Set { key: 1, value: 99 },
                DrainOp::End { key: 3 },
            ]
            .into_iter(),
        );
        assert_eq!(array, vec![10, 99, 30]);
    }

    #[test]
    fn test_pending_set_at_the_tail_is_flushed_by_the_end_record() {
        let mut array = vec![10];
        apply_ops(
            &mut array,
            vec![
                DrainOp::Set { key: 0, value: 5 },
                DrainOp::End { key: 1 },
            ]
            .into_iter(),
        );
        assert_eq!(array, vec![5]);
    }

    #[test]
    fn test_remove_then_set_overwrites_the_emerging_element() {
        let mut array = vec![10, 20, 30];
        apply_ops(
            &mut array,
            vec![
                DrainOp::Remove { key: 1, count: 1 },
                DrainOp::Set { key: 1, value: 99 },
                DrainOp::End { key: 2 },
            ]
            .into_iter(),
        );
        assert_eq!(array, vec![10, 99]);
    }

    #[test]
    fn test_interleaved_inserts_displace_the_committed_run() {
        let mut array = vec![10, 20];
        apply_ops(
            &mut array,
            vec![
                DrainOp::Insert { key: 0, value: 1 },
                DrainOp::Insert { key: 2, value: 2 },
                DrainOp::End { key: 4 },
            ]
            .into_iter(),
        );
        assert_eq!(array, vec![1, 10, 2, 20]);
    }

    #[test]
    fn test_settling_within_capacity_does_not_reallocate() {
        let mut array = Vec::with_capacity(8);
        array.extend_from_slice(&[1, 2, 3, 4]);
        let capacity = array.capacity();
        apply_ops(
            &mut array,
            vec![
                DrainOp::Insert { key: 0, value: 0 },
                DrainOp::Insert { key: 3, value: 9 },
                DrainOp::End { key: 6 },
            ]
            .into_iter(),
        );
        assert_eq!(array, vec![0, 1, 2, 9, 3, 4]);
        assert_eq!(array.capacity(), capacity);
    }
}
