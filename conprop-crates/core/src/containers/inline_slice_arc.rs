//! A reference-counted header followed by a slice of elements, stored in a single heap block.
//!
//! The block is laid out as
//! ```text
//! [ reference count | length | header H ][ padding ][ T; length ]
//! ```
//! so reading an element never chases a second pointer. The element type is restricted to
//! [`Copy`] types, which means that only the header needs to be dropped when the block is freed.
use std::alloc;
use std::alloc::Layout;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::marker::PhantomData;
use std::mem::offset_of;
use std::ptr::addr_of;
use std::ptr::addr_of_mut;
use std::ptr::NonNull;
use std::sync::atomic::fence;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use crate::basic_types::ConstructionError;
use crate::conprop_assert_moderate;
use crate::conprop_assert_simple;

/// The reference count is kept far below `usize::MAX` so that a leaked handle cannot wrap it.
const MAX_REFERENCE_COUNT: usize = isize::MAX as usize;

// The code below relies on the C layout: the elements start at the offset of `elements`.
#[repr(C)]
struct BlockPrefix<H, T> {
    count: AtomicUsize,
    len: usize,
    header: H,
    // The elements are not part of the type; `len` of them are stored from here on.
    elements: [T; 0],
}

/// A shared, immutable header `H` with a trailing `[T]`, allocated together.
///
/// Cloning the handle increments the reference count and never copies the contents; the block
/// is freed when the last handle is dropped.
pub struct InlineSliceArc<H, T: Copy> {
    ptr: NonNull<BlockPrefix<H, T>>,
    phantom: PhantomData<BlockPrefix<H, T>>,
}

// SAFETY: the header and the elements are only ever read through shared references once the
// handle has been created, and the reference count is atomic. This is the same reasoning as for
// `Arc<(H, [T])>`.
unsafe impl<H: Send + Sync, T: Copy + Send + Sync> Send for InlineSliceArc<H, T> {}
// SAFETY: see the `Send` implementation above.
unsafe impl<H: Send + Sync, T: Copy + Send + Sync> Sync for InlineSliceArc<H, T> {}

impl<H, T: Copy> InlineSliceArc<H, T> {
    /// Since the block is managed manually its size has to be known exactly; `size_of` only
    /// covers the prefix, so the layout of a block with `len` elements is computed here.
    pub(crate) fn layout_for(len: usize) -> Result<Layout, ConstructionError> {
        let overflow = ConstructionError::SizeOverflow { elements: len };

        let elements = Layout::array::<T>(len).map_err(|_| overflow)?;
        let size = offset_of!(BlockPrefix<H, T>, elements)
            .checked_add(elements.size())
            .ok_or(overflow)?
            .max(std::mem::size_of::<BlockPrefix<H, T>>());

        Layout::from_size_align(size, std::mem::align_of::<BlockPrefix<H, T>>())
            .map(|layout| layout.pad_to_align())
            .map_err(|_| overflow)
    }

    /// Allocates a new block and copies `elements` into it.
    pub fn new(header: H, elements: &[T]) -> Result<Self, ConstructionError> {
        let len = elements.len();
        let layout = Self::layout_for(len)?;

        // SAFETY: `layout` contains the reference count, so its size is never zero.
        let raw = unsafe { alloc::alloc(layout) };
        let Some(block) = NonNull::new(raw) else {
            return Err(ConstructionError::AllocationFailure {
                bytes: layout.size(),
            });
        };

        let ptr = block.cast::<BlockPrefix<H, T>>();
        // SAFETY: `raw` points to a fresh allocation described by `layout`, which covers the
        // prefix and `len` elements starting at the offset of `elements`. The prefix is written
        // first, since its trailing padding may overlap the elements, and `elements` cannot
        // overlap a fresh allocation.
        unsafe {
            ptr.as_ptr().write(BlockPrefix {
                count: AtomicUsize::new(1),
                len,
                header,
                elements: [],
            });
            let data = addr_of_mut!((*ptr.as_ptr()).elements).cast::<T>();
            std::ptr::copy_nonoverlapping(elements.as_ptr(), data, len);
        }

        Ok(InlineSliceArc {
            ptr,
            phantom: PhantomData,
        })
    }

    fn prefix(&self) -> &BlockPrefix<H, T> {
        // SAFETY: the prefix was initialised in `new` and lives as long as any handle does.
        unsafe { self.ptr.as_ref() }
    }

    fn data_ptr(&self) -> *mut T {
        // SAFETY: `ptr` points to a live block, and the place is only used for its address.
        unsafe { addr_of!((*self.ptr.as_ptr()).elements).cast::<T>().cast_mut() }
    }

    pub fn header(&self) -> &H {
        &self.prefix().header
    }

    pub fn len(&self) -> usize {
        self.prefix().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `len` elements were copied to `data_ptr` in `new` and are never mutated while
        // more than one handle exists. The pointer is derived from the whole block, so it may
        // be used to read past the prefix.
        unsafe { std::slice::from_raw_parts(self.data_ptr(), self.len()) }
    }

    /// Gives mutable access to the elements if this is the only handle to the block.
    pub fn get_mut_slice(&mut self) -> Option<&mut [T]> {
        if self.prefix().count.load(Ordering::Acquire) != 1 {
            return None;
        }

        // SAFETY: no other handle exists, and `&mut self` prevents new ones from being created
        // while the returned borrow is alive.
        Some(unsafe { std::slice::from_raw_parts_mut(self.data_ptr(), self.len()) })
    }

    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.ptr == other.ptr
    }

    pub fn strong_count(this: &Self) -> usize {
        this.prefix().count.load(Ordering::Acquire)
    }
}

impl<H, T: Copy> std::ops::Index<usize> for InlineSliceArc<H, T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        conprop_assert_moderate!(index < self.len());
        &self.as_slice()[index]
    }
}

impl<H, T: Copy> Clone for InlineSliceArc<H, T> {
    fn clone(&self) -> Self {
        let previous = self.prefix().count.fetch_add(1, Ordering::Relaxed);
        if previous > MAX_REFERENCE_COUNT {
            std::process::abort();
        }

        InlineSliceArc {
            ptr: self.ptr,
            phantom: PhantomData,
        }
    }
}

impl<H, T: Copy> Drop for InlineSliceArc<H, T> {
    fn drop(&mut self) {
        if self.prefix().count.fetch_sub(1, Ordering::Release) != 1 {
            return;
        }
        fence(Ordering::Acquire);

        let layout = match Self::layout_for(self.len()) {
            Ok(layout) => layout,
            Err(_) => {
                conprop_assert_simple!(false, "the layout of a live block cannot overflow");
                return;
            }
        };

        // SAFETY: this was the last handle, so nobody can observe the block anymore. The header
        // is dropped exactly once and the elements are `Copy`, so freeing the block with the
        // layout it was allocated with is all that remains.
        unsafe {
            std::ptr::drop_in_place(addr_of_mut!((*self.ptr.as_ptr()).header));
            alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), layout);
        }
    }
}

impl<H: Debug, T: Copy + Debug> Debug for InlineSliceArc<H, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineSliceArc")
            .field("header", self.header())
            .field("elements", &self.as_slice())
            .finish()
    }
}
