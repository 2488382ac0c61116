use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Context;
use rehook_core::{Runtime, SetState};

type Stash = Rc<RefCell<Option<SetState<i32>>>>;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let parent_next: Stash = Rc::new(RefCell::new(None));
    let child_bump: Stash = Rc::new(RefCell::new(None));

    let rt = Runtime::new();
    rt.enter({
        let (parent_next, child_bump) = (Rc::clone(&parent_next), Rc::clone(&child_bump));
        move |rt| {
            let (round, set_round) = rt.state(0)?;
            println!("round {round}");
            *parent_next.borrow_mut() = Some(set_round);

            rt.enter({
                let child_bump = Rc::clone(&child_bump);
                move |rt| {
                    let (hits, set_hits) = rt.state(0)?;
                    println!("  child hits {hits}");
                    *child_bump.borrow_mut() = Some(set_hits);
                    Ok(())
                }
            })?;
            Ok(())
        }
    })?;

    // Two child-only updates: the parent body does not re-run.
    for _ in 0..2 {
        let bump = child_bump
            .borrow_mut()
            .take()
            .context("child setter missing")?;
        bump.update(|hits| hits + 1)?;
    }

    // The child setter taken before the parent update outlives the rebuild,
    // but its scope does not: the write is ignored, and the fresh child
    // starts over at 0.
    let stale = child_bump
        .borrow_mut()
        .take()
        .context("child setter missing")?;
    let next = parent_next
        .borrow_mut()
        .take()
        .context("parent setter missing")?;
    next.update(|round| round + 1)?;
    stale.set(99)?;

    rt.dump_state();
    Ok(())
}
