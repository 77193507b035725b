use log::trace;

use tandem_serde::{BitReader, BitWrite, Serde, UnsignedInteger, UnsignedVariableInteger};

use crate::replication::{error::VarError, replicated::ChangeOrigin};

const TAG_ADD: u8 = 0;
const TAG_INSERT: u8 = 1;
const TAG_REMOVE: u8 = 2;
const TAG_REMOVE_AT: u8 = 3;
const TAG_SET_AT: u8 = 4;
const TAG_CLEAR: u8 = 5;
const TAG_FULL_SNAPSHOT: u8 = 6;

/// A structural mutation of a replicated list, replayable in order against
/// the last transmitted sequence
#[derive(Clone, Debug, PartialEq)]
pub enum ListEvent<T> {
    Add(T),
    Insert(usize, T),
    /// Remove the first element equal to the value
    Remove(T),
    RemoveAt(usize),
    /// `previous` is kept for notifications and is not sent
    SetAt {
        index: usize,
        value: T,
        previous: T,
    },
    Clear,
    /// Replaces the whole sequence; supersedes anything logged before it
    FullSnapshot(Vec<T>),
}

/// The kind of change a list notification reports
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListOperation {
    Add,
    Insert,
    RemoveAt,
    Set,
    Clear,
    /// The whole sequence was replaced
    Complete,
}

/// One change to a list, as passed to its change handler
#[derive(Clone, Debug, PartialEq)]
pub struct ListChange<T> {
    pub operation: ListOperation,
    pub index: Option<usize>,
    pub previous: Option<T>,
    pub value: Option<T>,
    pub origin: ChangeOrigin,
}

impl<T> ListChange<T> {
    fn new(operation: ListOperation, origin: ChangeOrigin) -> Self {
        Self {
            operation,
            index: None,
            previous: None,
            value: None,
            origin,
        }
    }

    fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    fn previous(mut self, previous: T) -> Self {
        self.previous = Some(previous);
        self
    }

    fn value(mut self, value: T) -> Self {
        self.value = Some(value);
        self
    }
}

impl<T: Serde> ListEvent<T> {
    pub fn name(&self) -> &'static str {
        match self {
            ListEvent::Add(_) => "Add",
            ListEvent::Insert(..) => "Insert",
            ListEvent::Remove(_) => "Remove",
            ListEvent::RemoveAt(_) => "RemoveAt",
            ListEvent::SetAt { .. } => "SetAt",
            ListEvent::Clear => "Clear",
            ListEvent::FullSnapshot(_) => "FullSnapshot",
        }
    }

    fn tag(&self) -> u8 {
        match self {
            ListEvent::Add(_) => TAG_ADD,
            ListEvent::Insert(..) => TAG_INSERT,
            ListEvent::Remove(_) => TAG_REMOVE,
            ListEvent::RemoveAt(_) => TAG_REMOVE_AT,
            ListEvent::SetAt { .. } => TAG_SET_AT,
            ListEvent::Clear => TAG_CLEAR,
            ListEvent::FullSnapshot(_) => TAG_FULL_SNAPSHOT,
        }
    }

    /// Apply to `sequence`, validating positions first so a rejected event
    /// leaves the sequence untouched. `SetAt` records the element it replaced.
    pub fn apply(
        &mut self,
        sequence: &mut Vec<T>,
        origin: ChangeOrigin,
    ) -> Result<ListChange<T>, VarError> {
        let len = sequence.len();
        let change = match self {
            ListEvent::Add(value) => {
                sequence.push(value.clone());
                ListChange::new(ListOperation::Add, origin)
                    .at(len)
                    .value(value.clone())
            }
            ListEvent::Insert(index, value) => {
                let index = *index;
                if index > len {
                    return Err(out_of_range("Insert", index, len));
                }
                sequence.insert(index, value.clone());
                ListChange::new(ListOperation::Insert, origin)
                    .at(index)
                    .value(value.clone())
            }
            ListEvent::Remove(value) => {
                let Some(index) = sequence.iter().position(|item| *item == *value) else {
                    return Err(VarError::ElementNotFound { event: "Remove" });
                };
                let removed = sequence.remove(index);
                ListChange::new(ListOperation::RemoveAt, origin)
                    .at(index)
                    .previous(removed)
            }
            ListEvent::RemoveAt(index) => {
                let index = *index;
                if index >= len {
                    return Err(out_of_range("RemoveAt", index, len));
                }
                let removed = sequence.remove(index);
                ListChange::new(ListOperation::RemoveAt, origin)
                    .at(index)
                    .previous(removed)
            }
            ListEvent::SetAt {
                index,
                value,
                previous,
            } => {
                let index = *index;
                let Some(slot) = sequence.get_mut(index) else {
                    return Err(out_of_range("SetAt", index, len));
                };
                *previous = std::mem::replace(slot, value.clone());
                ListChange::new(ListOperation::Set, origin)
                    .at(index)
                    .previous(previous.clone())
                    .value(value.clone())
            }
            ListEvent::Clear => {
                sequence.clear();
                ListChange::new(ListOperation::Clear, origin)
            }
            ListEvent::FullSnapshot(values) => {
                sequence.clone_from(values);
                ListChange::new(ListOperation::Complete, origin)
            }
        };
        trace!("applied list event {} (length {} -> {})", self.name(), len, sequence.len());
        Ok(change)
    }

    pub fn ser(&self, writer: &mut dyn BitWrite) {
        UnsignedInteger::<3>::new(self.tag()).ser(writer);
        match self {
            ListEvent::Add(value) | ListEvent::Remove(value) => value.ser(writer),
            ListEvent::Insert(index, value) | ListEvent::SetAt { index, value, .. } => {
                write_index(*index, writer);
                value.ser(writer);
            }
            ListEvent::RemoveAt(index) => write_index(*index, writer),
            ListEvent::Clear => {}
            ListEvent::FullSnapshot(values) => values.ser(writer),
        }
    }

    /// Write a `FullSnapshot` of `values` without building the event
    pub fn ser_full_snapshot(values: &Vec<T>, writer: &mut dyn BitWrite) {
        UnsignedInteger::<3>::new(TAG_FULL_SNAPSHOT).ser(writer);
        values.ser(writer);
    }

    pub fn de(reader: &mut BitReader) -> Result<Self, VarError> {
        let tag: u8 = UnsignedInteger::<3>::de(reader)?.to()?;
        let event = match tag {
            TAG_ADD => ListEvent::Add(T::de(reader)?),
            TAG_INSERT => {
                let index = read_index(reader)?;
                ListEvent::Insert(index, T::de(reader)?)
            }
            TAG_REMOVE => ListEvent::Remove(T::de(reader)?),
            TAG_REMOVE_AT => ListEvent::RemoveAt(read_index(reader)?),
            TAG_SET_AT => {
                let index = read_index(reader)?;
                let value = T::de(reader)?;
                // replaced by the real element once applied
                let previous = value.clone();
                ListEvent::SetAt {
                    index,
                    value,
                    previous,
                }
            }
            TAG_CLEAR => ListEvent::Clear,
            TAG_FULL_SNAPSHOT => ListEvent::FullSnapshot(Vec::<T>::de(reader)?),
            tag => return Err(VarError::UnknownEventTag { tag }),
        };
        Ok(event)
    }
}

fn out_of_range(event: &'static str, index: usize, len: usize) -> VarError {
    VarError::IndexOutOfRange { event, index, len }
}

pub(crate) fn write_count(count: usize, writer: &mut dyn BitWrite) {
    UnsignedVariableInteger::<4>::new(count as u64).ser(writer);
}

pub(crate) fn read_count(reader: &mut BitReader) -> Result<usize, VarError> {
    read_usize::<4>(reader)
}

fn write_index(index: usize, writer: &mut dyn BitWrite) {
    UnsignedVariableInteger::<5>::new(index as u64).ser(writer);
}

fn read_index(reader: &mut BitReader) -> Result<usize, VarError> {
    read_usize::<5>(reader)
}

fn read_usize<const BITS: u8>(reader: &mut BitReader) -> Result<usize, VarError> {
    let value = UnsignedVariableInteger::<BITS>::de(reader)?;
    usize::try_from(value.get()).map_err(|_| VarError::LengthOverflow { value: value.get() })
}
