use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// One dependency value of an effect site, erased down to its comparison
/// behavior.
///
/// [`Dep::of`] compares with the concrete type's `PartialEq` (value
/// identity); [`Dep::shared`] compares `Rc` allocation addresses (reference
/// identity). Neither walks an object graph for deep equality, and a
/// dependency whose concrete type changed at the same position always
/// compares as different.
#[derive(Clone)]
pub struct Dep {
    value: Rc<dyn Any>,
    type_name: &'static str,
    eq: fn(&dyn Any, &dyn Any) -> bool,
}

impl Dep {
    /// Dependency compared by value.
    pub fn of<T: PartialEq + 'static>(value: T) -> Self {
        Self {
            value: Rc::new(value),
            type_name: std::any::type_name::<T>(),
            eq: eq_by_value::<T>,
        }
    }

    /// Dependency compared by `Rc` identity: two handles to the same
    /// allocation match, equal contents in separate allocations do not.
    pub fn shared<T: 'static>(value: Rc<T>) -> Self {
        let value: Rc<dyn Any> = value;
        Self {
            value,
            type_name: std::any::type_name::<Rc<T>>(),
            eq: eq_by_address,
        }
    }

    /// Identity comparison against the dependency stored at the same
    /// position by the previous invocation.
    pub(crate) fn same(&self, stored: &Dep) -> bool {
        (self.eq)(&*self.value, &*stored.value)
    }
}

impl fmt::Debug for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dep<{}>", self.type_name)
    }
}

fn eq_by_value<T: PartialEq + 'static>(a: &dyn Any, b: &dyn Any) -> bool {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn eq_by_address(a: &dyn Any, b: &dyn Any) -> bool {
    std::ptr::eq(a as *const dyn Any as *const u8, b as *const dyn Any as *const u8)
}

/// Builds the dependency list for an effect declaration.
///
/// `deps![]` is the empty list: run the effect once when its site is first
/// recorded and never again. Elements go through [`Dep::of`] and compare by
/// value; build the list by hand with [`Dep::shared`] when a dependency
/// should compare by `Rc` identity instead.
#[macro_export]
macro_rules! deps {
    () => { ::std::vec::Vec::<$crate::Dep>::new() };
    ($($dep:expr),+ $(,)?) => { ::std::vec![$($crate::Dep::of($dep)),+] };
}
