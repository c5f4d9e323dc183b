/*!
Force computation of a two dimensional immersed boundary method: elastic and active
forces of a Lagrangian structure, spread onto the Eulerian fluid grid.
*/

mod immersed_boundary;

pub use immersed_boundary::*;
