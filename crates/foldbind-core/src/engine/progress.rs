#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    BackendStart {
        name: String,
        index: usize,
        total: usize,
    },
    BackendFailed {
        name: String,
        reason: String,
    },
    BackendSucceeded {
        name: String,
    },

    ToolStart {
        name: String,
    },
    ToolFinish {
        name: String,
        success: bool,
    },
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
