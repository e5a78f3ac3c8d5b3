//! Category forest built from the flat `category` rows of one store.
//!
//! Rows are grouped by `parent_id` once, then each root's subtree is moved
//! out of the grouping while it is walked, so every row is visited once.
//! Rows that no root reaches sit on a parent cycle.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use models::{category, subcategory};

use crate::errors::ServiceError;

/// Deepest allowed nesting; roots are depth 1.
pub const MAX_CATEGORY_DEPTH: usize = 8;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: category::Model,
    pub subcategories: Vec<subcategory::Model>,
    pub children: Vec<CategoryNode>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTree {
    pub roots: Vec<CategoryNode>,
    /// Parent id points outside the list; the row was promoted to a root.
    pub orphans: Vec<Uuid>,
    /// On or below a parent cycle; left out of `roots`.
    pub cyclic: Vec<Uuid>,
    /// Deeper than `MAX_CATEGORY_DEPTH`; left out of `roots`.
    pub truncated: Vec<Uuid>,
}

impl CategoryTree {
    pub fn is_sound(&self) -> bool {
        self.orphans.is_empty() && self.cyclic.is_empty() && self.truncated.is_empty()
    }
}

fn by_name(a: &category::Model, b: &category::Model) -> std::cmp::Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase()).then_with(|| a.id.cmp(&b.id))
}

pub fn build_tree(categories: Vec<category::Model>, subcategories: Vec<subcategory::Model>) -> CategoryTree {
    let ids: HashSet<Uuid> = categories.iter().map(|c| c.id).collect();
    let mut subs: HashMap<Uuid, Vec<subcategory::Model>> = HashMap::new();
    for s in subcategories {
        subs.entry(s.category_id).or_default().push(s);
    }

    let mut tree = CategoryTree::default();
    let mut roots = Vec::new();
    let mut children: HashMap<Uuid, Vec<category::Model>> = HashMap::new();
    for c in categories {
        match c.parent_id {
            None => roots.push(c),
            Some(p) if ids.contains(&p) => children.entry(p).or_default().push(c),
            Some(_) => {
                tree.orphans.push(c.id);
                roots.push(c);
            }
        }
    }

    roots.sort_by(by_name);
    for root in roots {
        let node = attach(root, 1, &mut children, &mut subs, &mut tree.truncated);
        tree.roots.push(node);
    }

    // whatever is still grouped was never reached from a root
    let mut stranded: Vec<category::Model> = children.into_values().flatten().collect();
    stranded.sort_by(by_name);
    tree.cyclic = stranded.into_iter().map(|c| c.id).collect();
    tree
}

fn attach(
    category: category::Model,
    depth: usize,
    children: &mut HashMap<Uuid, Vec<category::Model>>,
    subs: &mut HashMap<Uuid, Vec<subcategory::Model>>,
    truncated: &mut Vec<Uuid>,
) -> CategoryNode {
    let mut kids = children.remove(&category.id).unwrap_or_default();
    let mut subcategories = subs.remove(&category.id).unwrap_or_default();
    subcategories.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    let nested = if depth >= MAX_CATEGORY_DEPTH {
        for k in kids {
            drop_subtree(k.id, children, truncated);
        }
        Vec::new()
    } else {
        kids.sort_by(by_name);
        kids.into_iter()
            .map(|k| attach(k, depth + 1, children, subs, truncated))
            .collect()
    };
    CategoryNode { category, subcategories, children: nested }
}

fn drop_subtree(id: Uuid, children: &mut HashMap<Uuid, Vec<category::Model>>, out: &mut Vec<Uuid>) {
    let mut stack = vec![id];
    while let Some(next) = stack.pop() {
        out.push(next);
        if let Some(kids) = children.remove(&next) {
            stack.extend(kids.into_iter().map(|k| k.id));
        }
    }
}

/// Checks a parent assignment for `id` (`None` for a category not created yet)
/// against the store's current rows.
pub fn validate_parent(all: &[category::Model], id: Option<Uuid>, parent_id: Uuid) -> Result<(), ServiceError> {
    if Some(parent_id) == id {
        return Err(ServiceError::invalid("A category cannot be its own parent"));
    }
    let parents: HashMap<Uuid, Option<Uuid>> = all.iter().map(|c| (c.id, c.parent_id)).collect();
    if !parents.contains_key(&parent_id) {
        return Err(ServiceError::invalid("Parent category does not belong to this store"));
    }

    // depth of the parent, and whether `id` sits above it
    let mut parent_depth = 0;
    let mut cursor = Some(parent_id);
    while let Some(current) = cursor {
        if Some(current) == id {
            return Err(ServiceError::invalid("A category cannot be moved under its own descendant"));
        }
        parent_depth += 1;
        if parent_depth > all.len() {
            return Err(ServiceError::invalid("Parent category chain contains a cycle"));
        }
        cursor = parents.get(&current).copied().flatten();
    }

    let height = match id {
        Some(id) => subtree_height(all, id),
        None => 1,
    };
    if parent_depth + height > MAX_CATEGORY_DEPTH {
        return Err(ServiceError::invalid(format!("Categories can be nested at most {MAX_CATEGORY_DEPTH} levels deep")));
    }
    Ok(())
}

/// Levels in the subtree rooted at `id`, counting `id` itself.
fn subtree_height(all: &[category::Model], id: Uuid) -> usize {
    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for c in all {
        if let Some(p) = c.parent_id {
            children.entry(p).or_default().push(c.id);
        }
    }
    let mut seen = HashSet::new();
    let mut height = 0;
    let mut level = vec![id];
    while !level.is_empty() && height <= MAX_CATEGORY_DEPTH {
        height += 1;
        level = level
            .into_iter()
            .filter(|n| seen.insert(*n))
            .flat_map(|n| children.get(&n).cloned().unwrap_or_default())
            .collect();
    }
    height
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn cat(name: &str, parent: Option<Uuid>) -> category::Model {
        let now = Utc::now().into();
        category::Model {
            id: Uuid::new_v4(),
            store_id: Uuid::nil(),
            parent_id: parent,
            billboard_id: None,
            name: name.into(),
            slug: models::slug::slugify(name),
            created_at: now,
            updated_at: now,
        }
    }

    fn sub(name: &str, category_id: Uuid) -> subcategory::Model {
        let now = Utc::now().into();
        subcategory::Model {
            id: Uuid::new_v4(),
            store_id: Uuid::nil(),
            category_id,
            billboard_id: None,
            name: name.into(),
            slug: models::slug::slugify(name),
            created_at: now,
            updated_at: now,
        }
    }

    fn chain(len: usize) -> Vec<category::Model> {
        let mut out: Vec<category::Model> = Vec::new();
        for i in 0..len {
            let parent = out.last().map(|c| c.id);
            out.push(cat(&format!("level {i}"), parent));
        }
        out
    }

    #[test]
    fn nests_and_sorts_children_by_name() {
        let clothing = cat("Clothing", None);
        let shoes = cat("Shoes", None);
        let shirts = cat("shirts", Some(clothing.id));
        let coats = cat("Coats", Some(clothing.id));
        let tee = sub("Tees", shirts.id);
        let tree = build_tree(vec![shoes.clone(), shirts.clone(), clothing.clone(), coats.clone()], vec![tee.clone()]);

        assert!(tree.is_sound());
        let names: Vec<_> = tree.roots.iter().map(|n| n.category.name.as_str()).collect();
        assert_eq!(names, ["Clothing", "Shoes"]);
        let kids: Vec<_> = tree.roots[0].children.iter().map(|n| n.category.name.as_str()).collect();
        assert_eq!(kids, ["Coats", "shirts"]);
        assert_eq!(tree.roots[0].children[1].subcategories[0].id, tee.id);
    }

    #[test]
    fn orphans_are_promoted_to_roots() {
        let lost = cat("Lost", Some(Uuid::new_v4()));
        let tree = build_tree(vec![lost.clone()], vec![]);
        assert_eq!(tree.orphans, vec![lost.id]);
        assert_eq!(tree.roots.len(), 1);
    }

    #[test]
    fn cycles_are_reported_not_looped() {
        let mut a = cat("A", None);
        let b = cat("B", Some(a.id));
        let c = cat("C", Some(b.id));
        a.parent_id = Some(c.id);
        let me = {
            let mut m = cat("Me", None);
            m.parent_id = Some(m.id);
            m
        };
        let ok = cat("Fine", None);
        let tree = build_tree(vec![a.clone(), b.clone(), c.clone(), me.clone(), ok.clone()], vec![]);

        assert_eq!(tree.roots.len(), 1);
        assert_eq!(tree.roots[0].category.id, ok.id);
        let mut cyclic = tree.cyclic.clone();
        cyclic.sort();
        let mut expected = vec![a.id, b.id, c.id, me.id];
        expected.sort();
        assert_eq!(cyclic, expected);
    }

    #[test]
    fn depth_is_capped() {
        let rows = chain(MAX_CATEGORY_DEPTH + 2);
        let too_deep: Vec<Uuid> = rows[MAX_CATEGORY_DEPTH..].iter().map(|c| c.id).collect();
        let tree = build_tree(rows, vec![]);

        let mut depth = 0;
        let mut level = &tree.roots;
        while let Some(n) = level.first() {
            depth += 1;
            level = &n.children;
        }
        assert_eq!(depth, MAX_CATEGORY_DEPTH);
        let mut truncated = tree.truncated.clone();
        truncated.sort();
        let mut expected = too_deep;
        expected.sort();
        assert_eq!(truncated, expected);
    }

    #[test]
    fn parent_must_be_in_store_and_not_self() {
        let a = cat("A", None);
        let all = vec![a.clone()];
        assert!(validate_parent(&all, None, a.id).is_ok());
        assert!(validate_parent(&all, None, Uuid::new_v4()).is_err());
        assert!(validate_parent(&all, Some(a.id), a.id).is_err());
    }

    #[test]
    fn moving_under_descendant_is_rejected() {
        let a = cat("A", None);
        let b = cat("B", Some(a.id));
        let c = cat("C", Some(b.id));
        let all = vec![a.clone(), b.clone(), c.clone()];
        assert!(validate_parent(&all, Some(a.id), c.id).is_err());
        assert!(validate_parent(&all, Some(c.id), a.id).is_ok());
    }

    #[test]
    fn depth_limit_counts_moved_subtree() {
        let rows = chain(MAX_CATEGORY_DEPTH);
        let deepest = rows[MAX_CATEGORY_DEPTH - 1].id;
        // new leaf under the deepest level would be level 9
        assert!(validate_parent(&rows, None, deepest).is_err());
        assert!(validate_parent(&rows, None, rows[MAX_CATEGORY_DEPTH - 2].id).is_ok());

        // a two-level subtree fits under level 6, not under level 7
        let mut all = rows.clone();
        let top = cat("Top", None);
        let leaf = cat("Leaf", Some(top.id));
        all.push(top.clone());
        all.push(leaf);
        assert!(validate_parent(&all, Some(top.id), rows[5].id).is_ok());
        assert!(validate_parent(&all, Some(top.id), rows[6].id).is_err());
    }
}
