use anyhow::anyhow;

/// Whether a fake driven port should behave like its backing store is reachable
pub enum Connectivity {
    Connected,
    Disconnected,
}

impl Connectivity {
    /// Fails with a communication error while in the "disconnected" state
    pub fn blow_up_if_disconnected(&self) -> Result<(), anyhow::Error> {
        match self {
            Self::Connected => Ok(()),
            Self::Disconnected => Err(anyhow!("could not connect to the database")),
        }
    }
}

/// Records every call made to a faked function and replays a canned result.
///
/// * [Args] is what gets captured from each call
/// * [Ret] is the type handed back to the caller
///
/// Async trait methods are awkward to mock with the usual tooling, so fakes hold one of these
/// per method behind a [Mutex](std::sync::Mutex):
///
/// ```ignore
/// impl ItemPort for Mutex<MockItemService> {
///     async fn item_by_id(&self, item_id: i32, /* ... */) -> Result<TodoItem, Error> {
///         let mut locked_self = self.lock().unwrap();
///         locked_self.item_by_id_result.save_arguments(item_id);
///         locked_self.item_by_id_result.return_value()
///     }
/// }
/// ```
pub struct FakeImplementation<Args, Ret> {
    saved_arguments: Vec<Args>,
    return_value: Option<Ret>,
}

impl<Args, Ret> FakeImplementation<Args, Ret> {
    pub fn new() -> FakeImplementation<Args, Ret> {
        FakeImplementation {
            saved_arguments: Vec::new(),
            return_value: None,
        }
    }

    /// Captures the arguments of a single invocation
    pub fn save_arguments(&mut self, arguments: Args) {
        self.saved_arguments.push(arguments)
    }

    /// Arguments from every invocation so far, oldest first
    pub fn calls(&self) -> &[Args] {
        self.saved_arguments.as_slice()
    }

    pub fn set_return_value(&mut self, return_value: Ret) {
        self.return_value = Some(return_value)
    }
}

impl<Args, Ret> FakeImplementation<Args, Ret>
where
    Ret: Clone,
{
    /// Hands back a copy of the configured value. Panics if no value was configured, which
    /// means the test exercised a call it didn't expect.
    pub fn return_value(&self) -> Ret {
        match self.return_value {
            None => panic!("Tried to return from a function where the return value wasn't set!"),
            Some(ref ret_val) => ret_val.clone(),
        }
    }
}
