//! Access to structured context without knowing the concrete error type.

use std::error::Error;

use crate::{Chain, Data, StructuredFailure};

/// An error that can report attached structured context.
pub trait StructuredContext {
    fn structured_data(&self) -> &Data;
}

impl StructuredContext for StructuredFailure {
    fn structured_data(&self) -> &Data {
        self.data()
    }
}

impl<T: StructuredContext + ?Sized> StructuredContext for &T {
    fn structured_data(&self) -> &Data {
        (**self).structured_data()
    }
}

impl<T: StructuredContext + ?Sized> StructuredContext for Box<T> {
    fn structured_data(&self) -> &Data {
        (**self).structured_data()
    }
}

/// Payload of `err` when it is a [`StructuredFailure`]; `None` for any other
/// error. Only `err` itself is inspected, not its causes.
pub fn data_of<'a>(err: &'a (dyn Error + 'static)) -> Option<&'a Data> {
    err.downcast_ref::<StructuredFailure>()
        .map(StructuredContext::structured_data)
}

/// First [`StructuredFailure`] in the chain starting at `err`.
pub fn find_failure<'a>(err: &'a (dyn Error + 'static)) -> Option<&'a StructuredFailure> {
    Chain::new(err).find_map(|link| link.downcast_ref::<StructuredFailure>())
}
