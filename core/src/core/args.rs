// chainflow/src/core/args.rs

//! A type-erased argument pack carried from a chain-method call to the step
//! function that eventually runs it.

use std::any::Any;

/// Arguments captured at the moment a chain method is called.
///
/// Chain methods are dispatched by name, so their arguments cross a single
/// dynamically typed seam: values are stored as `Box<dyn Any + Send>` and the
/// step function downcasts them back with [`get`] or [`take`].
///
/// ```
/// use chainflow::CallArgs;
///
/// let mut args = CallArgs::new().with(42_i32).with("hello".to_string());
/// assert_eq!(args.get::<i32>(0), Some(&42));
/// assert_eq!(args.take::<String>(1).as_deref(), Some("hello"));
/// ```
///
/// [`get`]: CallArgs::get
/// [`take`]: CallArgs::take
#[derive(Default)]
pub struct CallArgs {
  values: Vec<Box<dyn Any + Send>>,
}

impl CallArgs {
  pub fn new() -> Self {
    Self { values: Vec::new() }
  }

  /// Appends a value, returning the pack for fluent construction.
  pub fn with<T: Send + 'static>(mut self, value: T) -> Self {
    self.values.push(Box::new(value));
    self
  }

  pub fn push<T: Send + 'static>(&mut self, value: T) {
    self.values.push(Box::new(value));
  }

  /// Borrows the value at `index` if it has type `T`.
  pub fn get<T: 'static>(&self, index: usize) -> Option<&T> {
    self.values.get(index)?.downcast_ref::<T>()
  }

  /// Moves the value at `index` out of the pack if it has type `T`.
  ///
  /// The slot is left behind (holding a unit) so later indices keep their
  /// positions.
  pub fn take<T: Send + 'static>(&mut self, index: usize) -> Option<T> {
    let slot = self.values.get_mut(index)?;
    if !slot.is::<T>() {
      return None;
    }
    let boxed = std::mem::replace(slot, Box::new(()));
    boxed.downcast::<T>().ok().map(|value| *value)
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

// Box<dyn Any> carries no useful Debug output, so only the arity is shown.
impl std::fmt::Debug for CallArgs {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CallArgs").field("len", &self.values.len()).finish()
  }
}
