/*!
Expansion of ordinary proofs.

Hyper- and UR-resolution steps compress a whole clash --- several binary
resolutions, equality flips, and an implicit renumbering --- into one
record.
[expand_proof] replays each such step as its parts: a Copy+Flip step for
every flipped satellite equality, one binary resolution per clash link
(x=x links replay as XX steps), and a final Copy step applying any Merge
modifiers, which inherits the original clause's id.
All other steps pass through untouched, so the output is still a proof in
the ordinary (non-atomic) vocabulary, ready for the
[Ivy expansion](crate::proofs::ivy).

Every replayed clause is checked equivalent (by mutual subsumption) to the
clause it replaces; disagreement is a broken invariant, not a judgement
call.
*/

use crate::kernel::Kernel;
use crate::misc::log::targets;
use crate::procedures::resolve::{resolve2, xx_resolve2};
use crate::procedures::subsume::subsumes;
use crate::proofs::{copy_clause_ija, flip_copy, ProofMap};
use crate::structures::clause::ClauseId;
use crate::structures::justification::{ClashLink, CopyMod, JustStep, Justification};
use crate::types::err::{fatal, ErrorKind};

/// Expands hyper/UR steps into binary chains. Returns the new proof.
pub fn expand_proof(k: &mut Kernel, proof: &[ClauseId]) -> Result<Vec<ClauseId>, ErrorKind> {
    let mut map = ProofMap::default();
    let mut next_id = proof
        .iter()
        .filter_map(|&c| k.clauses[c].id)
        .max()
        .unwrap_or(0)
        + 1;
    let mut out = Vec::new();

    for &c in proof {
        let num = k.clauses[c].id.ok_or_else(|| fatal("proof clause without id"))?;
        let justification = k.clauses[c].justification.clone();

        match &justification.primary {
            JustStep::HyperRes { nucleus, links } | JustStep::UrRes { nucleus, links } => {
                let final_clause = expand_clash(
                    k,
                    &mut map,
                    *nucleus,
                    links,
                    &justification.mods,
                    num,
                    &mut next_id,
                    &mut out,
                )?;
                check_equivalent(k, c, final_clause)?;
                map.set(num, final_clause);
            }

            JustStep::BinaryRes { p1, l1, p2, l2 } if *l2 < 0 => {
                // Make the satellite flip explicit.
                let sat = map.get(*p2)?;
                let flip_lit = l2.unsigned_abs() as usize;
                let flipped = emit_flip(k, sat, *p2, flip_lit, &mut next_id, &mut out)?;
                let flipped_num = k.clauses[flipped].id.expect("! Flip step without id");

                let nuc = map.get(*p1)?;
                let res = resolve2(k, nuc, *l1 as usize, flipped, flip_lit as i32, true)?
                    .ok_or_else(|| fatal("expansion: binary step does not replay"))?;
                k.clauses.get_mut(res).id = Some(num);
                apply_mods_in_replay(k, res, &justification.mods);
                check_equivalent(k, c, res)?;
                out.push(res);
                map.set(num, res);
            }

            _ => {
                out.push(c);
                map.set(num, c);
            }
        }
    }
    Ok(out)
}

/// Replays one clash as single steps; returns the clause standing for the
/// original resolvent.
fn expand_clash(
    k: &mut Kernel,
    map: &mut ProofMap,
    nucleus: u32,
    links: &[ClashLink],
    mods: &[CopyMod],
    final_num: u32,
    next_id: &mut u32,
    out: &mut Vec<ClauseId>,
) -> Result<ClauseId, ErrorKind> {
    if links.is_empty() {
        return Err(fatal("expansion: clash step without links"));
    }
    let mut cur = map.get(nucleus)?;
    // Position of each original nucleus literal in the current clause.
    let mut positions: Vec<usize> = (1..=k.clauses[cur].literals.len()).collect();

    for link in links {
        let pos = positions[link.nuc_lit - 1];

        let step = if link.sat == 0 {
            xx_resolve2(k, cur, pos, true)?
                .ok_or_else(|| fatal("expansion: xx step does not replay"))?
        } else {
            let mut sat = map.get(link.sat)?;
            let mut sat_lit = link.sat_lit;
            if sat_lit < 0 {
                sat = emit_flip(k, sat, link.sat, sat_lit.unsigned_abs() as usize, next_id, out)?;
                sat_lit = -sat_lit;
            }
            resolve2(k, cur, pos, sat, sat_lit, true)?
                .ok_or_else(|| fatal("expansion: clash link does not replay"))?
        };

        let id = *next_id;
        *next_id += 1;
        k.clauses.get_mut(step).id = Some(id);
        out.push(step);
        map.set(id, step);

        // The resolved literal is gone; later nucleus literals shift left.
        for p in positions.iter_mut() {
            if *p > pos {
                *p -= 1;
            }
        }
        cur = step;
    }

    if mods.is_empty() {
        // The last step stands for the original clause.
        let last_id = k.clauses[cur].id.expect("! Replay step without id");
        map.set(last_id, cur); // keep the intermediate name valid
        k.clauses.get_mut(cur).id = Some(final_num);
        *next_id -= 1; // the provisional id was never used
        Ok(cur)
    } else {
        // One more Copy step carrying the merges.
        let parent_num = k.clauses[cur].id.expect("! Replay step without id");
        let child = copy_clause_ija(k, cur);
        apply_merges(k, child, mods);
        let mut justification = Justification::new(JustStep::Copy { parent: parent_num });
        justification.mods = mods.to_vec();
        {
            let clause = k.clauses.get_mut(child);
            clause.justification = justification;
            clause.id = Some(final_num);
        }
        out.push(child);
        Ok(child)
    }
}

fn emit_flip(
    k: &mut Kernel,
    sat: ClauseId,
    sat_num: u32,
    lit: usize,
    next_id: &mut u32,
    out: &mut Vec<ClauseId>,
) -> Result<ClauseId, ErrorKind> {
    let flipped = flip_copy(k, sat, lit)?;
    let mut justification = Justification::new(JustStep::Copy { parent: sat_num });
    justification.mods.push(CopyMod::Flip(lit));
    let id = *next_id;
    *next_id += 1;
    {
        let clause = k.clauses.get_mut(flipped);
        clause.justification = justification;
        clause.id = Some(id);
    }
    out.push(flipped);
    Ok(flipped)
}

/// Merge modifiers were recorded against the unmerged resolvent; apply them
/// to the replay.
fn apply_merges(k: &mut Kernel, cid: ClauseId, mods: &[CopyMod]) {
    let mut remove: Vec<usize> = mods
        .iter()
        .filter_map(|m| match m {
            CopyMod::Merge(n) => Some(*n - 1),
            _ => None,
        })
        .collect();
    remove.sort_unstable();
    for &i in remove.iter().rev() {
        if i < k.clauses[cid].literals.len() {
            let atom = k.clauses[cid].literals[i].atom;
            k.terms.zap_term(atom);
            k.clauses.get_mut(cid).literals.remove(i);
        }
    }
}

fn apply_mods_in_replay(k: &mut Kernel, cid: ClauseId, mods: &[CopyMod]) {
    if !mods.is_empty() {
        apply_merges(k, cid, mods);
        k.clauses.get_mut(cid).justification.mods = mods.to_vec();
    }
}

fn check_equivalent(k: &mut Kernel, original: ClauseId, replay: ClauseId) -> Result<(), ErrorKind> {
    let forward = subsumes(
        &k.terms,
        &mut k.contexts,
        &k.clauses[original],
        &k.clauses[replay],
    );
    let backward = subsumes(
        &k.terms,
        &mut k.contexts,
        &k.clauses[replay],
        &k.clauses[original],
    );
    if forward && backward {
        Ok(())
    } else {
        log::warn!(target: targets::PROOFS, "Replayed clause differs from the original.");
        Err(fatal("expansion: replayed clause not equivalent"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProverConfig;
    use crate::procedures::saturate::{Prover, ProverReport};

    #[test]
    fn hyper_steps_become_binary_chains() {
        let mut prover = Prover::new(ProverConfig {
            binary_resolution: false,
            pos_hyper_resolution: true,
            paramodulation: false,
            ordered_res: false,
            ..ProverConfig::default()
        });
        prover.add_input_str("-p(x) | -q(x).").unwrap();
        prover.add_input_str("p(a).").unwrap();
        prover.add_input_str("q(a).").unwrap();

        assert_eq!(prover.search().unwrap(), ProverReport::ProofFound);
        let proof = prover.proof().unwrap();

        let k = &mut prover.kernel;
        let expanded = expand_proof(k, &proof).unwrap();
        assert!(expanded.len() >= proof.len());
        for &c in &expanded {
            assert!(!matches!(
                k.clauses[c].justification.primary,
                JustStep::HyperRes { .. } | JustStep::UrRes { .. }
            ));
        }
    }
}
