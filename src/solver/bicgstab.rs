//! Right-preconditioned BiCGStab (Saad §7.4.2, van der Vorst 1992).
//!
//! Solves `A M⁻¹ u = b`, `x = M⁻¹ u`, so the monitored residual is the true
//! residual `b − A x` whatever the preconditioner.

use crate::core::traits::{InnerProduct, MatVec};
use crate::error::ImfError;
use crate::preconditioner::Preconditioner;
use crate::solver::LinearSolver;
use crate::utils::convergence::{Convergence, SolveStats};
use tracing::debug;

pub struct BiCgStabSolver<T> {
    pub conv: Convergence<T>,
}

impl<T: num_traits::Float> BiCgStabSolver<T> {
    pub fn new(tol: T, max_iters: usize) -> Self {
        Self { conv: Convergence { tol, max_iters } }
    }
}

/// z = M⁻¹ r, or a copy of r without preconditioner.
fn precondition<M, V: Clone>(pc: Option<&dyn Preconditioner<M, V>>, r: &V) -> Result<V, ImfError> {
    let mut z = r.clone();
    if let Some(pc) = pc {
        pc.apply(r, &mut z)?;
    }
    Ok(z)
}

impl<M, V, T> LinearSolver<M, V> for BiCgStabSolver<T>
where
    M: MatVec<V>,
    (): InnerProduct<V, Scalar = T>,
    V: AsMut<[T]> + AsRef<[T]> + From<Vec<T>> + Clone,
    T: num_traits::Float + From<f64>,
{
    type Error = ImfError;
    type Scalar = T;

    fn solve(
        &mut self,
        a: &M,
        pc: Option<&dyn Preconditioner<M, V>>,
        b: &V,
        x: &mut V,
    ) -> Result<SolveStats<T>, ImfError> {
        let n = b.as_ref().len();
        if x.as_ref().len() != n {
            return Err(ImfError::DimensionMismatch { expected: n, found: x.as_ref().len() });
        }
        let ip = ();
        // r0 = b - A x0
        let mut tmp = V::from(vec![T::zero(); n]);
        a.matvec(x, &mut tmp);
        let mut r = V::from(b.as_ref().iter().zip(tmp.as_ref()).map(|(&bi, &ax)| bi - ax).collect::<Vec<_>>());
        let r_hat = r.clone(); // shadow residual
        let res0 = ip.norm(&r);
        let mut stats = SolveStats { iterations: 0, final_residual: res0, converged: res0 == T::zero() };
        if stats.converged {
            return Ok(stats);
        }

        let mut rho_prev = T::one();
        let mut alpha = T::one();
        let mut omega = T::one();
        let mut p = V::from(vec![T::zero(); n]);
        let mut v = V::from(vec![T::zero(); n]);
        for i in 1..=self.conv.max_iters {
            let rho = ip.dot(&r_hat, &r);
            if rho.abs() < T::min_positive_value() {
                return Err(ImfError::SolveError(format!("BiCGStab breakdown: rho = 0 at iteration {i}")));
            }
            let beta = (rho / rho_prev) * (alpha / omega);
            // p = r + beta * (p - omega * v)
            for ((p_j, r_j), v_j) in p.as_mut().iter_mut().zip(r.as_ref()).zip(v.as_ref()) {
                *p_j = *r_j + beta * (*p_j - omega * *v_j);
            }
            // v = A M⁻¹ p
            let p_hat = precondition(pc, &p)?;
            a.matvec(&p_hat, &mut v);
            let alpha_den = ip.dot(&r_hat, &v);
            if alpha_den.abs() < T::min_positive_value() {
                return Err(ImfError::SolveError(format!("BiCGStab breakdown: (r̂, v) = 0 at iteration {i}")));
            }
            alpha = rho / alpha_den;
            // s = r - alpha * v
            let s = V::from(r.as_ref().iter().zip(v.as_ref()).map(|(&rj, &vj)| rj - alpha * vj).collect::<Vec<_>>());
            let (_, half) = self.conv.check(ip.norm(&s), res0, i);
            if half.converged {
                for (xj, pj) in x.as_mut().iter_mut().zip(p_hat.as_ref()) {
                    *xj = *xj + alpha * *pj;
                }
                stats = half;
                break;
            }
            // t = A M⁻¹ s
            let s_hat = precondition(pc, &s)?;
            let mut t = V::from(vec![T::zero(); n]);
            a.matvec(&s_hat, &mut t);
            let tt = ip.dot(&t, &t);
            omega = if tt > T::zero() { ip.dot(&t, &s) / tt } else { T::zero() };
            // x = x + alpha * p̂ + omega * ŝ
            for ((xj, pj), sj) in x.as_mut().iter_mut().zip(p_hat.as_ref()).zip(s_hat.as_ref()) {
                *xj = *xj + alpha * *pj + omega * *sj;
            }
            // r = s - omega * t
            r = V::from(s.as_ref().iter().zip(t.as_ref()).map(|(&sj, &tj)| sj - omega * tj).collect::<Vec<_>>());
            let (stop, full) = self.conv.check(ip.norm(&r), res0, i);
            stats = full;
            if stop {
                break;
            }
            if omega == T::zero() {
                return Err(ImfError::SolveError(format!("BiCGStab stagnation: omega = 0 at iteration {i}")));
            }
            rho_prev = rho;
        }
        debug!(
            iterations = stats.iterations,
            converged = stats.converged,
            "BiCGStab finished"
        );
        Ok(stats)
    }
}
