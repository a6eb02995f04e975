//! Path resolution: component-wise walk with bounded symlink following,
//! plus the whole-path fast path for backends that resolve paths
//! themselves.
//!
//! The walk keeps its state (remaining path, parent FH, hop count) in
//! locals of an explicit loop, so stack depth stays bounded no matter how
//! the backend completes.

use std::sync::Arc;

use tracing::trace;

use super::attr::mask::{ATTR_FH, ATTR_MODE};
use super::attr::Attr;
use super::backend::caps::CAP_FS_PATH_OP;
use super::dispatch::VfsRouter;
use super::lookup_flags::LOOKUP_FOLLOW;
use super::open_cache::OpenHandle;
use super::open_flags::{OPEN_DIRECTORY, OPEN_INFERRED, OPEN_PATH};
use super::{Cred, FileHandle, VfsError, VfsResult, VFS_NAME_MAX, VFS_PATH_MAX, VFS_SYMLOOP_MAX};

/// Validates a user-supplied leaf name for mutation operations.
///
/// An empty name is invalid, "." and ".." are rejected as names, and a
/// component longer than the name limit is too long.
pub fn validate_leaf_name(name: &[u8]) -> VfsResult<()> {
    if name.is_empty() {
        return Err(VfsError::Inval);
    }
    if name == b"." || name == b".." {
        return Err(VfsError::BadName);
    }
    if name.len() > VFS_NAME_MAX {
        return Err(VfsError::NameTooLong);
    }
    Ok(())
}

/// Strips leading and trailing slashes.
fn trim_path(mut path: &[u8]) -> &[u8] {
    while let Some((&b'/', rest)) = path.split_first() {
        path = rest;
    }
    while let Some((&b'/', rest)) = path.split_last() {
        path = rest;
    }
    path
}

/// Splits off the first component of an already-trimmed path, returning
/// the component and the remainder (without leading slashes).
fn split_component(path: &[u8]) -> (&[u8], &[u8]) {
    match path.iter().position(|&b| b == b'/') {
        Some(pos) => {
            let (component, mut rest) = path.split_at(pos);
            while let Some((&b'/', tail)) = rest.split_first() {
                rest = tail;
            }
            (component, rest)
        }
        None => (path, &[][..]),
    }
}

/// Builds the spliced continuation path after reading a symlink target.
fn splice_target(target: &[u8], remaining: &[u8]) -> VfsResult<Vec<u8>> {
    let mut spliced = Vec::with_capacity(target.len() + 1 + remaining.len());
    spliced.extend_from_slice(target);
    if !remaining.is_empty() {
        spliced.push(b'/');
        spliced.extend_from_slice(remaining);
    }
    if spliced.len() > VFS_PATH_MAX {
        return Err(VfsError::NameTooLong);
    }
    Ok(spliced)
}

/// An attribute record carrying just the starting FH, for the empty-path
/// case: resolving an already-resolved FH returns it unchanged.
fn identity_attrs(fh: &FileHandle, attr_mask: u64) -> Attr {
    let mut attr = Attr::request(attr_mask);
    attr.set_mask = ATTR_FH;
    attr.fh = Some(fh.clone());
    attr
}

/// Resolves `path` relative to `start_fh`, following symlinks in
/// intermediate components always and in the final component when
/// `LOOKUP_FOLLOW` is set. Returns the attributes of the final object,
/// which always include its FH.
pub async fn lookup_path(
    router: &VfsRouter,
    cred: &Cred,
    start_fh: &FileHandle,
    path: &[u8],
    attr_mask: u64,
    flags: u32,
) -> VfsResult<Attr> {
    if path.len() > VFS_PATH_MAX {
        return Err(VfsError::NameTooLong);
    }

    let trimmed = trim_path(path);
    if trimmed.is_empty() {
        return Ok(identity_attrs(start_fh, attr_mask));
    }

    let mut current: Vec<u8> = trimmed.to_vec();
    let mut cur_fh = start_fh.clone();
    let mut hops: u32 = 0;

    loop {
        // Fast path: the backend resolves whole paths itself.
        if router.capabilities_for(&cur_fh) & CAP_FS_PATH_OP != 0 {
            let dir = open_dir(router, cred, &cur_fh).await?;
            let result = router
                .lookup_at(cred, &dir, &current, attr_mask | ATTR_MODE | ATTR_FH, 0)
                .await;
            router.release(&dir);
            let (attr, _dir_attr) = result?;
            if attr.is_symlink() && flags & LOOKUP_FOLLOW != 0 {
                // The backend stopped at a trailing symlink; splice and
                // walk on from the starting point.
                hops += 1;
                if hops > VFS_SYMLOOP_MAX {
                    return Err(VfsError::Loop);
                }
                let target = readlink_of(router, cred, &attr).await?;
                let (next_fh, next_path) = continuation(start_fh, &cur_fh, &target, &[])?;
                cur_fh = next_fh;
                current = next_path;
                continue;
            }
            return Ok(attr);
        }

        // Component walk.
        let (component, rest) = {
            let (component, rest) = split_component(&current);
            (component.to_vec(), rest.to_vec())
        };
        if component.len() > VFS_NAME_MAX {
            return Err(VfsError::NameTooLong);
        }
        let final_component = rest.is_empty();

        let dir = open_dir(router, cred, &cur_fh).await?;
        // Mode is always requested so symlinks are detected; the FH is
        // needed to continue the walk and to report the result.
        let want = if final_component { attr_mask } else { 0 };
        let result =
            router.lookup_at(cred, &dir, &component, want | ATTR_MODE | ATTR_FH, 0).await;
        router.release(&dir);
        let (attr, _dir_attr) = result?;

        let follow = attr.is_symlink() && (!final_component || flags & LOOKUP_FOLLOW != 0);

        if follow {
            hops += 1;
            if hops > VFS_SYMLOOP_MAX {
                trace!("symlink loop after {} hops", hops);
                return Err(VfsError::Loop);
            }
            let target = readlink_of(router, cred, &attr).await?;
            let (next_fh, next_path) = continuation(start_fh, &cur_fh, &target, &rest)?;
            cur_fh = next_fh;
            current = next_path;
            continue;
        }

        if final_component {
            return Ok(attr);
        }

        cur_fh = attr.fh.clone().ok_or(VfsError::Fault)?;
        current = rest;
    }
}

/// Opens a directory FH for walking.
async fn open_dir(
    router: &VfsRouter,
    cred: &Cred,
    fh: &FileHandle,
) -> VfsResult<Arc<OpenHandle>> {
    router.open_fh(cred, fh, OPEN_PATH | OPEN_INFERRED | OPEN_DIRECTORY).await
}

/// Reads the target of the symlink whose attributes were just returned.
async fn readlink_of(router: &VfsRouter, cred: &Cred, attr: &Attr) -> VfsResult<Vec<u8>> {
    let link_fh = attr.fh.clone().ok_or(VfsError::Fault)?;
    let link = router.open_fh(cred, &link_fh, OPEN_PATH | OPEN_INFERRED).await?;
    let result = router.readlink(cred, &link).await;
    router.release(&link);
    result
}

/// Decides where the walk continues after a symlink: absolute targets
/// restart from the starting FH, relative targets continue from the
/// directory holding the link.
fn continuation(
    start_fh: &FileHandle,
    parent_fh: &FileHandle,
    target: &[u8],
    remaining: &[u8],
) -> VfsResult<(FileHandle, Vec<u8>)> {
    if target.is_empty() {
        return Err(VfsError::Inval);
    }
    if target[0] == b'/' {
        let trimmed = trim_path(target);
        Ok((start_fh.clone(), splice_target(trimmed, remaining)?))
    } else {
        Ok((parent_fh.clone(), splice_target(target, remaining)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_name_policies() {
        assert_eq!(validate_leaf_name(b"").unwrap_err(), VfsError::Inval);
        assert_eq!(validate_leaf_name(b".").unwrap_err(), VfsError::BadName);
        assert_eq!(validate_leaf_name(b"..").unwrap_err(), VfsError::BadName);
        assert_eq!(
            validate_leaf_name(&vec![b'a'; VFS_NAME_MAX + 1]).unwrap_err(),
            VfsError::NameTooLong
        );
        assert!(validate_leaf_name(b"ordinary").is_ok());
    }

    #[test]
    fn component_splitting() {
        assert_eq!(split_component(b"a/b/c"), (&b"a"[..], &b"b/c"[..]));
        assert_eq!(split_component(b"a//b"), (&b"a"[..], &b"b"[..]));
        assert_eq!(split_component(b"leaf"), (&b"leaf"[..], &b""[..]));
    }

    #[test]
    fn path_trimming() {
        assert_eq!(trim_path(b"//x/y/"), b"x/y");
        assert_eq!(trim_path(b"///"), b"");
    }
}
