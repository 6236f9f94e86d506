use ringdeque::RingBuffer;
use std::{cell::RefCell, rc::Rc};

#[derive(Debug)]
struct DropTracker {
  id: String,
  payload: String,
  log: Rc<RefCell<Vec<String>>>,
}

impl DropTracker {
  fn new(log: &Rc<RefCell<Vec<String>>>, id: i32) -> Self {
    Self {
      id: id.to_string(),
      payload: format!("payload-{id}"),
      log: Rc::clone(log),
    }
  }
}

impl Drop for DropTracker {
  fn drop(&mut self) {
    self.log.borrow_mut().push(self.id.clone());
  }
}

fn main() {
  let drops = Rc::new(RefCell::new(Vec::new()));

  {
    let mut deque = RingBuffer::<DropTracker>::with_capacity(7);

    for id in 0..4 {
      deque.push_back(DropTracker::new(&drops, id));
    }

    // Wraps the front around the end of the block, then forces a growth.
    for id in 4..10 {
      deque.push_front(DropTracker::new(&drops, id));
    }
    assert_eq!(deque.capacity(), 15);
    assert!(deque.health_check().is_ok());

    for (idx, elem) in deque.iter_mut().enumerate().skip(2).take(4) {
      elem.payload.push_str(&format!("-touched-{idx}"));
    }

    deque.insert(3, DropTracker::new(&drops, 10));
    let erased = deque.erase(0);
    assert_eq!(erased.id, "9");
    drop(erased);

    let mut cursor = deque.end() - 1;
    assert_eq!(cursor.id, "3");
    cursor -= 2;
    assert_eq!(cursor.id, "1");

    // Shrinking below the length drops the tail.
    deque.refit(6);
    assert_eq!(deque.len(), 8);
    assert!(deque.health_check().is_ok());

    let popped: Vec<_> = [deque.pop_front(), deque.pop_back()]
      .into_iter()
      .flatten()
      .collect();
    assert_eq!(popped.len(), 2);
    drop(popped);

    let rest: Vec<_> = deque.into_iter().take(3).collect();
    assert!(rest.iter().all(|elem| elem.payload.starts_with("payload-")));
  }

  let mut dropped = drops.borrow().clone();
  dropped.sort();
  let mut expected = (0..11).map(|id| id.to_string()).collect::<Vec<_>>();
  expected.sort();
  assert_eq!(dropped, expected);
}
