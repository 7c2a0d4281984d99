extern crate std;

use core::ptr;
use std::io::{self, IoSlice, Write};

use crate::{Allocator, DynArray, ReserveError};

fn out_of_memory(err: ReserveError) -> io::Error {
    io::Error::new(io::ErrorKind::OutOfMemory, err)
}

/// Write is implemented for `DynArray<u8, A>` by appending to the array.
/// The array will grow as needed.
///
/// If storage cannot be obtained, the write fails with
/// [`ErrorKind::OutOfMemory`](io::ErrorKind::OutOfMemory) and nothing is appended.
impl<A: Allocator> Write for DynArray<u8, A> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = self.len();
        let num = buf.len();

        self.try_reserve_for(num).map_err(out_of_memory)?;

        unsafe {
            ptr::copy_nonoverlapping(buf.as_ptr(), self.as_mut_ptr().add(len), num);
            self.set_len(len + num);
        }

        Ok(num)
    }

    #[inline(always)]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[inline]
    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        let num = bufs.iter().map(|b| b.len()).sum::<usize>();

        self.try_reserve_for(num).map_err(out_of_memory)?;
        for buf in bufs {
            let buf_len = buf.len();
            let vec_len = self.len();
            unsafe {
                ptr::copy_nonoverlapping(buf.as_ptr(), self.as_mut_ptr().add(vec_len), buf_len);
                self.set_len(vec_len + buf_len);
            }
        }

        Ok(num)
    }

    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        Write::write(self, buf)?;
        Ok(())
    }
}
