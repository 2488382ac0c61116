use std::cell::RefCell;
use std::rc::Rc;

use rehook_core::{Runtime, deps};

type Task = Box<dyn FnOnce() -> rehook_core::Result<()>>;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let tasks: Rc<RefCell<Vec<Task>>> = Rc::new(RefCell::new(Vec::new()));

    let rt = Runtime::new();
    rt.enter({
        let tasks = Rc::clone(&tasks);
        move |rt| {
            let (state, set_state) = rt.state(String::from("thing"))?;
            println!("state: {state}");

            // Schedules the append instead of running it inline, the way a
            // timer callback would.
            let queue = Rc::clone(&tasks);
            let deferred = set_state.clone();
            rt.effect(deps![state.clone()], move || {
                queue
                    .borrow_mut()
                    .push(Box::new(move || deferred.update(|prev| prev + "a")));
            })?;

            rt.effect(deps![], move || {
                println!("running");
                set_state.set(String::from("epic state"))
            })?;
            Ok(())
        }
    })?;

    // Three ticks of the timer loop; each run of the chain queues the next.
    for _ in 0..3 {
        let batch: Vec<Task> = tasks.borrow_mut().drain(..).collect();
        for task in batch {
            task()?;
        }
    }

    rt.dump_state();
    Ok(())
}
