pub mod siswa;
