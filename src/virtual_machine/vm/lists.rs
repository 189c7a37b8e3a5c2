use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::isa::ListId;
use std::collections::BTreeMap;

/// Lowest id `HALT` renders; output lists below it are never printed.
pub(super) const FIRST_RENDERED_ID: ListId = 1;

/// Currently bound list, if any. Rebound by every declaration.
pub(super) type Cursor = Option<ListId>;

/// A numbered register holding an ordered sequence of bytes.
///
/// `can_output` is fixed when the list is declared; redeclaring the same id
/// replaces the whole list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MicroList {
    id: ListId,
    values: Vec<u8>,
    can_output: bool,
}

impl MicroList {
    /// Creates an empty list.
    pub fn new(id: ListId, can_output: bool) -> Self {
        Self {
            id,
            values: Vec::new(),
            can_output,
        }
    }

    pub fn id(&self) -> ListId {
        self.id
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// True for lists declared with `ml.`.
    pub fn can_output(&self) -> bool {
        self.can_output
    }

    pub(super) fn push(&mut self, byte: u8) {
        self.values.push(byte);
    }

    pub(super) fn extend(&mut self, bytes: &[u8]) {
        self.values.extend_from_slice(bytes);
    }

    /// Replaces the contents with `values`.
    pub(super) fn replace(&mut self, values: Vec<u8>) {
        self.values = values;
    }
}

/// All lists of one VM run, keyed and iterated by ascending id.
#[derive(Debug, Default)]
pub(super) struct Lists {
    lists: BTreeMap<ListId, MicroList>,
}

impl Lists {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn clear(&mut self) {
        self.lists.clear();
    }

    pub(super) fn len(&self) -> usize {
        self.lists.len()
    }

    /// Registers a fresh, empty list under `id`, discarding any previous list
    /// with that id, and returns the cursor bound to it.
    pub(super) fn declare(&mut self, id: ListId, can_output: bool) -> Cursor {
        self.lists.insert(id, MicroList::new(id, can_output));
        Some(id)
    }

    pub(super) fn get(&self, id: ListId) -> Option<&MicroList> {
        self.lists.get(&id)
    }

    /// Returns the list under the cursor.
    ///
    /// `target` names what was about to be added, for the error message.
    pub(super) fn current_mut(
        &mut self,
        cursor: Cursor,
        target: &'static str,
    ) -> Result<&mut MicroList, VMError> {
        cursor
            .and_then(|id| self.lists.get_mut(&id))
            .ok_or(VMError::NoCurrentList { target })
    }

    /// Returns an owned copy of list `id`'s contents.
    pub(super) fn snapshot(&self, id: ListId) -> Result<Vec<u8>, VMError> {
        self.get(id)
            .map(|list| list.values.clone())
            .ok_or(VMError::UndefinedList { id })
    }

    /// Iterates every list in ascending id order.
    pub(super) fn iter(&self) -> impl Iterator<Item = &MicroList> {
        self.lists.values()
    }

    /// Iterates the lists declared with `ml.` whose id is at least
    /// [`FIRST_RENDERED_ID`], in ascending id order.
    pub(super) fn outputs(&self) -> impl Iterator<Item = &MicroList> {
        self.lists
            .range(FIRST_RENDERED_ID..)
            .map(|(_, list)| list)
            .filter(|list| list.can_output)
    }
}
