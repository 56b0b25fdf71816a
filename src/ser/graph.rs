//
// Copyright 2026 biplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! The writer's first pass over a value graph.
//!
//! Container header bytes encode a reference-index width that is only
//! known once the whole graph has been counted, so the writer flattens the
//! value tree into an arena before a single byte is emitted. Every arena
//! index is a reference number in the finished document; entry order here
//! is emission order there.
//!
//! Deduplication is asymmetric by design: scalars deduplicate by value
//! equality, so equal leaves share one reference number, while containers
//! are identified by their arena index alone and never collapse, even
//! when structurally identical to one another.

use log::debug;

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::value::Value;

/// One distinct object in the document, with container children replaced
/// by their reference numbers.
#[derive(Clone, Debug)]
pub enum WrappedValue<'a> {
    /// A non-container value, borrowed from the input graph.
    Scalar(&'a Value),
    /// An array of element references.
    Array(Vec<usize>),
    /// A set of element references.
    Set(Vec<usize>),
    /// A dictionary of key and value reference pairs.
    Dictionary(Vec<(usize, usize)>),
}

/// The flattened form of a value graph, produced by the analysis pass and
/// consumed by the emission pass.
#[derive(Debug)]
pub struct ObjectGraph<'a> {
    objects: Vec<WrappedValue<'a>>,
    reference_slots: usize,
}

impl<'a> ObjectGraph<'a> {

    /// Flattens the given root value, assigning reference number 0 to the
    /// root and consecutive numbers to a container's direct children
    /// before descending into any of them.
    pub fn build(root: &'a Value) -> Result<ObjectGraph<'a>> {
        let mut builder = Builder {
            objects: Vec::new(),
            scalars: HashMap::new(),
            reference_slots: 0,
        };

        let root_index = builder.reference(root)?;
        if root.is_container() {
            builder.flatten(root_index, root)?;
        }

        let objects = builder.objects
            .into_iter()
            .collect::<Option<Vec<WrappedValue>>>()
            .ok_or(Error::InternalInconsistency("container never flattened during analysis"))?;

        debug!(
            "analyzed object graph: {} distinct objects across {} reference slots",
            objects.len(),
            builder.reference_slots,
        );

        Ok(ObjectGraph {
            objects,
            reference_slots: builder.reference_slots,
        })
    }

    /// The number of distinct objects, which is also the offset table
    /// entry count recorded in the trailer.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// The total number of reference slots the document will contain.
    pub fn reference_slots(&self) -> usize {
        self.reference_slots
    }

    /// The smallest byte width of {1, 2, 4, 8} able to index every
    /// distinct object. This becomes the trailer's object reference size.
    pub fn object_reference_size(&self) -> usize {
        super::int_size(self.objects.len() as u64)
    }

    /// Returns the object assigned the given reference number.
    pub fn object(&self, index: usize) -> &WrappedValue<'a> {
        &self.objects[index]
    }

}

struct Builder<'a> {
    /// Arena slots in reference number order. A container's slot remains
    /// empty between allocation and flattening.
    objects: Vec<Option<WrappedValue<'a>>>,
    /// Reference numbers already assigned to scalar values.
    scalars: HashMap<&'a Value, usize>,
    reference_slots: usize,
}

impl<'a> Builder<'a> {

    /// Assigns a reference number to the given value without visiting its
    /// children. Scalars seen before reuse their number; containers always
    /// receive a fresh one.
    fn reference(&mut self, value: &'a Value) -> Result<usize> {
        self.reference_slots += 1;

        match value {
            Value::Null =>
                Err(Error::UnsupportedType("the null marker has no binary representation")),

            Value::Array(_) | Value::Set(_) | Value::Dictionary(_) => {
                let index = self.objects.len();
                self.objects.push(None);
                Ok(index)
            }

            scalar => {
                if let Some(&index) = self.scalars.get(scalar) {
                    return Ok(index);
                }
                let index = self.objects.len();
                self.objects.push(Some(WrappedValue::Scalar(scalar)));
                self.scalars.insert(scalar, index);
                Ok(index)
            }
        }
    }

    /// Fills in a container's arena slot: assigns reference numbers to all
    /// of its direct children, then descends into each child container.
    fn flatten(&mut self, index: usize, value: &'a Value) -> Result<()> {
        match value {
            Value::Array(elements) => {
                let references = elements.iter()
                    .map(|element| self.reference(element))
                    .collect::<Result<Vec<usize>>>()?;
                self.objects[index] = Some(WrappedValue::Array(references.clone()));
                self.flatten_children(elements.iter(), references)
            }

            Value::Set(elements) => {
                let references = elements.iter()
                    .map(|element| self.reference(element))
                    .collect::<Result<Vec<usize>>>()?;
                self.objects[index] = Some(WrappedValue::Set(references.clone()));
                self.flatten_children(elements.iter(), references)
            }

            Value::Dictionary(entries) => {
                let keys = entries.keys()
                    .map(|key| self.reference(key))
                    .collect::<Result<Vec<usize>>>()?;
                let values = entries.values()
                    .map(|value| self.reference(value))
                    .collect::<Result<Vec<usize>>>()?;
                let pairs = keys.iter()
                    .copied()
                    .zip(values.iter().copied())
                    .collect::<Vec<(usize, usize)>>();
                self.objects[index] = Some(WrappedValue::Dictionary(pairs));
                self.flatten_children(entries.keys(), keys)?;
                self.flatten_children(entries.values(), values)
            }

            _ =>
                Err(Error::InternalInconsistency("scalar presented for flattening")),
        }
    }

    fn flatten_children<I>(&mut self, children: I, references: Vec<usize>) -> Result<()>
    where
        I: Iterator<Item = &'a Value>,
    {
        for (child, reference) in children.zip(references) {
            if child.is_container() {
                self.flatten(reference, child)?;
            }
        }
        Ok(())
    }

}
