//! Project tree walking
//!
//! One depth-first walk shared by asset resolution and bin management.
//! Items are visited parent before children, children in host order.

use super::{ProjectItem, ProjectItemHandle};

/// Visit every item under `root` (root included) with its depth
pub fn walk<'a, F>(root: &'a ProjectItem, visit: &mut F)
where
    F: FnMut(&'a ProjectItem, usize),
{
    walk_at(root, 0, visit);
}

fn walk_at<'a, F>(item: &'a ProjectItem, depth: usize, visit: &mut F)
where
    F: FnMut(&'a ProjectItem, usize),
{
    visit(item, depth);
    for child in item.children() {
        walk_at(child, depth + 1, visit);
    }
}

/// All items matching `predicate`, in walk order
pub fn find_all<P>(root: &ProjectItem, predicate: P) -> Vec<&ProjectItem>
where
    P: Fn(&ProjectItem) -> bool,
{
    let mut found = Vec::new();
    walk(root, &mut |item, _| {
        if predicate(item) {
            found.push(item);
        }
    });
    found
}

/// First item matching `predicate`, in walk order
pub fn find_first<P>(root: &ProjectItem, predicate: P) -> Option<&ProjectItem>
where
    P: Fn(&ProjectItem) -> bool,
{
    find_all(root, predicate).into_iter().next()
}

/// Every media item under `root`
pub fn media_items(root: &ProjectItem) -> Vec<&ProjectItem> {
    find_all(root, |item| !item.is_bin())
}

/// Look up an item by handle
pub fn find_handle<'a>(root: &'a ProjectItem, handle: &ProjectItemHandle) -> Option<&'a ProjectItem> {
    find_first(root, |item| &item.handle == handle)
}

/// Handle of the bin that directly contains `handle`
pub fn parent_of<'a>(root: &'a ProjectItem, handle: &ProjectItemHandle) -> Option<&'a ProjectItem> {
    find_first(root, |item| {
        item.children().iter().any(|child| &child.handle == handle)
    })
}

/// Mutable lookup, used by hosts that own their tree
pub fn find_handle_mut<'a>(
    item: &'a mut ProjectItem,
    handle: &ProjectItemHandle,
) -> Option<&'a mut ProjectItem> {
    if &item.handle == handle {
        return Some(item);
    }
    let children = item.children_mut()?;
    children
        .iter_mut()
        .find_map(|child| find_handle_mut(child, handle))
}

/// Detach the item with `handle` from wherever it sits in the tree
pub fn detach(item: &mut ProjectItem, handle: &ProjectItemHandle) -> Option<ProjectItem> {
    let children = item.children_mut()?;
    if let Some(position) = children.iter().position(|child| &child.handle == handle) {
        return Some(children.remove(position));
    }
    children.iter_mut().find_map(|child| detach(child, handle))
}
