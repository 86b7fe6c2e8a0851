use std::collections::BTreeMap;

use anyhow::Result;

use crate::git::refs::{RefNode, ref_list};
use crate::git::repo::repo_find;

pub fn run() -> Result<()> {
    let repo = repo_find(".")?;

    let refs = ref_list(&repo, None)?;
    print_refs(&refs, "refs");

    Ok(())
}

fn print_refs(refs: &BTreeMap<String, RefNode>, prefix: &str) {
    for (name, node) in refs {
        match node {
            RefNode::Ref(Some(sha)) => println!("{sha} {prefix}/{name}"),
            // Unresolved refs are omitted.
            RefNode::Ref(None) => {}
            RefNode::Dir(children) => print_refs(children, &format!("{prefix}/{name}")),
        }
    }
}
